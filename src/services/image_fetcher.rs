use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while downloading label images
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to fetch image {url}: {source}")]
    RequestError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("image {url} returned status {status}")]
    BadStatus { url: String, status: u16 },
}

/// Downloads images referenced by URL
///
/// Fetches are plain GETs, one after another, with no retry.
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    client: Client,
}

impl ImageFetcher {
    pub fn new(timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let request_error = |source| FetchError::RequestError {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(request_error)?;

        if !response.status().is_success() {
            return Err(FetchError::BadStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(request_error)?;
        tracing::debug!("Fetched {} bytes from {}", bytes.len(), url);

        Ok(bytes.to_vec())
    }

    /// Fetch every URL in order, stopping at the first failure
    pub async fn fetch_all(&self, urls: &[String]) -> Result<Vec<Vec<u8>>, FetchError> {
        let mut images = Vec::with_capacity(urls.len());
        for url in urls {
            images.push(self.fetch(url).await?);
        }
        Ok(images)
    }
}
