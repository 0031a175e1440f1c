use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_METADATA_URL: &str = "http://metadata.google.internal";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Errors that can occur while minting identity tokens
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Failed to read credentials: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Failed to sign assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("Token endpoint returned error: {0}")]
    ApiError(String),

    #[error("Invalid token response: {0}")]
    InvalidResponse(String),
}

/// Mints bearer tokens for a target audience
#[async_trait]
pub trait IdentityTokenProvider: Send + Sync {
    async fn id_token(&self, audience: &str) -> Result<String, IdentityError>;
}

/// Fields of a Google service account key file the assertion needs
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, IdentityError> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|e| IdentityError::InvalidCredentials(e.to_string()))
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    sub: &'a str,
    aud: &'a str,
    target_audience: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    id_token: Option<String>,
}

/// Where Google identity tokens come from
#[derive(Debug, Clone)]
pub enum IdentitySource {
    /// Self-signed assertion exchanged at the key's token URI
    ServiceAccount(ServiceAccountKey),
    /// Compute metadata server of the running instance
    MetadataServer { base_url: String },
}

/// Google ID token provider
pub struct GoogleIdentity {
    source: IdentitySource,
    client: Client,
}

impl GoogleIdentity {
    pub fn new(source: IdentitySource, client: Client) -> Self {
        Self { source, client }
    }

    /// Use the service account key when a credentials file is known,
    /// the metadata server otherwise
    pub fn from_credentials_path(path: Option<&str>, client: Client) -> Result<Self, IdentityError> {
        let source = match path {
            Some(path) => IdentitySource::ServiceAccount(ServiceAccountKey::from_file(path)?),
            None => IdentitySource::MetadataServer {
                base_url: DEFAULT_METADATA_URL.to_string(),
            },
        };
        Ok(Self::new(source, client))
    }

    fn sign_assertion(key: &ServiceAccountKey, audience: &str) -> Result<String, IdentityError> {
        let now = chrono::Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &key.client_email,
            sub: &key.client_email,
            aud: &key.token_uri,
            target_audience: audience,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
        Ok(encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)?)
    }

    async fn exchange_assertion(&self, key: &ServiceAccountKey, assertion: &str) -> Result<String, IdentityError> {
        let response = self
            .client
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Identity token exchange failed: {} - {}", status, body);
            return Err(IdentityError::ApiError(format!("status {}", status)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::InvalidResponse(e.to_string()))?;

        token
            .id_token
            .ok_or_else(|| IdentityError::InvalidResponse("Missing id_token".into()))
    }

    async fn metadata_token(&self, base_url: &str, audience: &str) -> Result<String, IdentityError> {
        let url = format!(
            "{}/computeMetadata/v1/instance/service-accounts/default/identity?audience={}",
            base_url.trim_end_matches('/'),
            urlencoding::encode(audience)
        );

        let response = self
            .client
            .get(&url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IdentityError::ApiError(format!(
                "Metadata server returned {}",
                response.status()
            )));
        }

        let token = response.text().await?.trim().to_string();
        if token.is_empty() {
            return Err(IdentityError::InvalidResponse("Empty identity token".into()));
        }
        Ok(token)
    }
}

#[async_trait]
impl IdentityTokenProvider for GoogleIdentity {
    async fn id_token(&self, audience: &str) -> Result<String, IdentityError> {
        tracing::debug!("Minting identity token for {}", audience);

        match &self.source {
            IdentitySource::ServiceAccount(key) => {
                let assertion = Self::sign_assertion(key, audience)?;
                self.exchange_assertion(key, &assertion).await
            }
            IdentitySource::MetadataServer { base_url } => self.metadata_token(base_url, audience).await,
        }
    }
}
