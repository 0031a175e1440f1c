use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use crate::models::Preference;
use crate::services::ScoreTarget;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub compute_score: ComputeScoreSettings,
    #[serde(default)]
    pub ocr: OcrSettings,
    #[serde(default)]
    pub fetch: FetchSettings,
    #[serde(default)]
    pub client: ClientSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

/// Scoring pipeline behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct ComputeScoreSettings {
    #[serde(default)]
    pub retry_with_google_bounding_polys: bool,
    /// Upper bound on OCR + interpretation passes for one request
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
}

impl Default for ComputeScoreSettings {
    fn default() -> Self {
        Self {
            retry_with_google_bounding_polys: false,
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_max_attempts() -> usize { 2 }

#[derive(Debug, Clone, Deserialize)]
pub struct OcrSettings {
    #[serde(default = "default_ocr_endpoint")]
    pub endpoint: String,
    pub api_key: Option<String>,
    #[serde(default = "default_ocr_timeout")]
    pub timeout_secs: u64,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            endpoint: default_ocr_endpoint(),
            api_key: None,
            timeout_secs: default_ocr_timeout(),
        }
    }
}

fn default_ocr_endpoint() -> String { "https://vision.googleapis.com/v1/images:annotate".to_string() }
fn default_ocr_timeout() -> u64 { 60 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FetchSettings {
    /// No timeout when unset
    pub timeout_secs: Option<u64>,
}

/// Settings for calling a deployed score service
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSettings {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_api_port")]
    pub api_port: Option<u16>,
    /// Inferred from `api_url` when unset
    pub target: Option<ScoreTarget>,
    #[serde(default = "default_client_timeout")]
    pub timeout_secs: u64,
    pub credentials_path: Option<String>,
    #[serde(default = "default_user_id")]
    pub user_id: String,
    #[serde(default = "default_preferences")]
    pub preferences: Vec<Preference>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_port: default_api_port(),
            target: None,
            timeout_secs: default_client_timeout(),
            credentials_path: None,
            user_id: default_user_id(),
            preferences: default_preferences(),
        }
    }
}

impl ClientSettings {
    pub fn resolved_target(&self) -> ScoreTarget {
        self.target.unwrap_or_else(|| ScoreTarget::infer(&self.api_url))
    }
}

fn default_api_url() -> String { "http://localhost".to_string() }
fn default_api_port() -> Option<u16> { Some(8080) }
fn default_client_timeout() -> u64 { 3600 }
fn default_user_id() -> String { "dummy_user_id".to_string() }
fn default_preferences() -> Vec<Preference> { Preference::ALL.to_vec() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with SCORE__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., SCORE__COMPUTE_SCORE__MAX_ATTEMPTS -> compute_score.max_attempts
            .add_source(env_source())
            .build()?;

        substitute_env_vars(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?;

        substitute_env_vars(settings)?.try_deserialize()
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("SCORE")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Apply the standard Google environment variables when set
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(api_key) = env::var("GOOGLE_API_KEY") {
        builder = builder.set_override("ocr.api_key", api_key)?;
    }
    if let Ok(credentials) = env::var("GOOGLE_APPLICATION_CREDENTIALS") {
        builder = builder.set_override("client.credentials_path", credentials)?;
    }

    builder.build()
}
