use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use crate::config::ClientSettings;
use crate::models::{ImageInput, Preference, SentMessage};
use crate::routes::score::{Route, SCORE_PREFIX};
use crate::routes::API_PREFIX;
use crate::services::identity::{GoogleIdentity, IdentityError, IdentityTokenProvider};

/// Errors that can occur when calling the score service
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Failed to mint identity token: {0}")]
    Identity(#[from] IdentityError),

    #[error("Remote target requires a token or an identity provider")]
    MissingIdentityProvider,

    #[error("Failed to serialize request: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Where the score service runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreTarget {
    /// Development server reached on an explicit port, no auth
    Local,
    /// Deployed service behind identity-token auth
    Remote,
}

impl ScoreTarget {
    /// Fallback classification when configuration does not say
    pub fn infer(host_url: &str) -> Self {
        if host_url.contains("localhost") {
            ScoreTarget::Local
        } else {
            ScoreTarget::Remote
        }
    }

    /// Base URL for this target; the port only applies locally
    pub fn call_url(&self, host_url: &str, port: Option<u16>) -> String {
        match (self, port) {
            (ScoreTarget::Local, Some(port)) => format!("{}:{}", host_url, port),
            _ => host_url.to_string(),
        }
    }
}

pub fn http_call_url(host_url: &str, api_app_port: Option<u16>) -> String {
    ScoreTarget::infer(host_url).call_url(host_url, api_app_port)
}

pub fn build_full_route(router_prefix: &str, route: &str) -> String {
    build_full_route_with_prefix(router_prefix, route, API_PREFIX)
}

pub fn build_full_route_with_prefix(router_prefix: &str, route: &str, api_app_prefix: &str) -> String {
    format!("{}{}{}", api_app_prefix, router_prefix, route)
}

/// Raw reply of the score service
///
/// The body is returned whatever the status, so callers check `status`.
#[derive(Debug, Clone)]
pub struct ScoreCallResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl ScoreCallResponse {
    pub fn is_success(&self) -> bool {
        self.status == StatusCode::OK
    }

    pub fn json<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Client for the compute score endpoint
pub struct ScoreClient {
    api_url: String,
    api_port: Option<u16>,
    target: ScoreTarget,
    timeout: Duration,
    user_id: String,
    preferences: Vec<Preference>,
    client: Client,
    identity: Option<Arc<dyn IdentityTokenProvider>>,
}

impl ScoreClient {
    pub fn new(api_url: String, api_port: Option<u16>, target: ScoreTarget, timeout: Duration) -> Self {
        Self {
            api_url,
            api_port,
            target,
            timeout,
            user_id: "dummy_user_id".to_string(),
            preferences: Preference::ALL.to_vec(),
            client: Client::new(),
            identity: None,
        }
    }

    /// Build a client from configuration, wiring Google identity for remote targets
    pub fn from_settings(settings: &ClientSettings) -> Result<Self, ClientError> {
        let target = settings.resolved_target();
        let mut client = Self::new(
            settings.api_url.clone(),
            settings.api_port,
            target,
            Duration::from_secs(settings.timeout_secs),
        )
        .with_user(settings.user_id.clone(), settings.preferences.clone());

        if target == ScoreTarget::Remote {
            let identity = GoogleIdentity::from_credentials_path(
                settings.credentials_path.as_deref(),
                client.client.clone(),
            )?;
            client = client.with_identity(Arc::new(identity));
        }

        Ok(client)
    }

    pub fn with_identity(mut self, identity: Arc<dyn IdentityTokenProvider>) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>, preferences: Vec<Preference>) -> Self {
        self.user_id = user_id.into();
        self.preferences = preferences;
        self
    }

    pub fn request_url(&self) -> String {
        self.target.call_url(&self.api_url, self.api_port)
            + &build_full_route(SCORE_PREFIX, Route::POST_COMPUTE_SCORE)
    }

    pub fn request_data(
        &self,
        images: Option<Vec<ImageInput>>,
        images_urls: Option<Vec<String>>,
        images_labels: Option<Vec<String>>,
    ) -> Result<String, ClientError> {
        let message = SentMessage::new(
            images,
            images_urls,
            images_labels,
            self.user_id.clone(),
            self.preferences.clone(),
        );
        Ok(serde_json::to_string(&message)?)
    }

    async fn authorization_token(&self, given: Option<String>) -> Result<Option<String>, ClientError> {
        match (given, self.target) {
            (Some(token), _) => Ok(Some(token)),
            (None, ScoreTarget::Local) => Ok(None),
            (None, ScoreTarget::Remote) => {
                let identity = self.identity.as_ref().ok_or(ClientError::MissingIdentityProvider)?;
                Ok(Some(identity.id_token(&self.api_url).await?))
            }
        }
    }

    /// Send images to the compute score endpoint
    pub async fn post_compute_score(
        &self,
        images: Option<Vec<ImageInput>>,
        images_urls: Option<Vec<String>>,
        images_labels: Option<Vec<String>>,
        authorization_token: Option<String>,
    ) -> Result<ScoreCallResponse, ClientError> {
        let token = self.authorization_token(authorization_token).await?;
        let url = self.request_url();
        let body = self.request_data(images, images_urls, images_labels)?;

        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .body(body);

        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();

        if status != StatusCode::OK {
            tracing::error!(
                "Error during post_compute_score at {} : {}",
                self.api_url,
                String::from_utf8_lossy(&body)
            );
        }

        Ok(ScoreCallResponse { status, body })
    }
}
