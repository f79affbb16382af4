//! Raw byte retrieval for dataset sources.
//!
//! Remote sources are downloaded with `reqwest` under the configured timeout
//! and user agent; sources with a local `path` are read from disk instead.

use std::time::Duration;

use defis_core::{AppConfig, SourceConfig};
use reqwest::Client;

use crate::error::LoadError;
use crate::retry::retry_with_backoff;

/// Downloads (or reads) the raw bytes of a dataset source.
#[derive(Debug, Clone)]
pub struct SourceFetcher {
    client: Client,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl SourceFetcher {
    /// Builds a fetcher from the application config.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(config: &AppConfig) -> Result<Self, LoadError> {
        Self::with_settings(
            config.fetch_timeout_secs,
            &config.user_agent,
            config.fetch_max_retries,
            config.fetch_retry_backoff_ms,
        )
    }

    /// Builds a fetcher with explicit settings (tests use a zero back-off).
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_settings(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, LoadError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Returns the raw bytes of `source`.
    ///
    /// # Errors
    ///
    /// - [`LoadError::Io`] if a local file cannot be read.
    /// - [`LoadError::UnexpectedStatus`] on a non-2xx response after retries.
    /// - [`LoadError::Http`] on network failure after retries.
    pub async fn fetch(&self, source: &SourceConfig) -> Result<Vec<u8>, LoadError> {
        if let Some(path) = &source.path {
            tracing::debug!(source_id = %source.id, path = %path.display(), "reading local source");
            return tokio::fs::read(path).await.map_err(|e| LoadError::Io {
                path: path.display().to_string(),
                source: e,
            });
        }

        let url = source.download_url();
        tracing::debug!(source_id = %source.id, %url, "downloading source");
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.request_bytes(&url)
        })
        .await
    }

    async fn request_bytes(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}
