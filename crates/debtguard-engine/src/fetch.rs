use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

/// Source extraction failed. The display text is fixed; the cause is in `detail`.
#[derive(Clone, Debug, thiserror::Error)]
#[error("No se pudo leer la URL de GitHub.")]
pub struct FetchError {
    pub url: String,
    pub detail: String,
}

impl FetchError {
    pub fn new(url: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            detail: detail.into(),
        }
    }
}

/// Turns a remote URL into plain text.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;
}

/// Fetches through a reader proxy: `GET {prefix}{url}` with the target
/// appended verbatim. Single attempt, no retries.
pub struct ReaderProxy {
    client: reqwest::Client,
    prefix: String,
}

impl ReaderProxy {
    pub fn new(prefix: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("debtguard/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self {
            client,
            prefix: prefix.into(),
        }
    }

    pub fn target(&self, url: &str) -> String {
        format!("{}{url}", self.prefix)
    }
}

#[async_trait]
impl ContentFetcher for ReaderProxy {
    #[instrument(skip(self))]
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let target = self.target(url);
        let response = self
            .client
            .get(&target)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "reader proxy request failed");
                FetchError::new(url, format!("request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "reader proxy returned error status");
            return Err(FetchError::new(url, format!("HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::new(url, format!("failed to read response: {e}")))?;
        debug!(bytes = body.len(), "source extracted");
        Ok(body)
    }
}
