//! TheSession data client
//!
//! Downloads the tune and alias tables published in the TheSession-data
//! repository. Rows are returned untouched; validation happens in the
//! tune consolidator.

use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tunemap_common::config::SourcesConfig;

use super::tune_consolidator::{RawAliasRow, RawTuneRow};
use crate::utils::http_retry::{retry_with_backoff, RetryPolicy, Transient};

const USER_AGENT: &str = concat!("tunemap/", env!("CARGO_PKG_VERSION"));

/// TheSession client errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl Transient for SessionError {
    fn is_transient(&self) -> bool {
        match self {
            SessionError::NetworkError(_) => true,
            SessionError::ApiError(status, _) => *status == 429 || *status >= 500,
            SessionError::ParseError(_) => false,
        }
    }
}

/// Both raw tables
#[derive(Debug, Clone, Default)]
pub struct RawTuneTables {
    pub tunes: Vec<RawTuneRow>,
    pub aliases: Vec<RawAliasRow>,
}

pub struct SessionClient {
    http_client: reqwest::Client,
    tunes_url: String,
    aliases_url: String,
    retry: RetryPolicy,
}

impl SessionClient {
    pub fn new(sources: &SourcesConfig) -> Result<Self, SessionError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(sources.timeout_secs))
            .build()
            .map_err(|e| SessionError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            tunes_url: sources.tunes_url.clone(),
            aliases_url: sources.aliases_url.clone(),
            retry: RetryPolicy::with_max_attempts(sources.max_attempts),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SessionError> {
        tracing::debug!(url = %url, "Downloading TheSession data");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| SessionError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SessionError::ApiError(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| SessionError::ParseError(e.to_string()))
    }

    pub async fn fetch_tunes(&self) -> Result<Vec<RawTuneRow>, SessionError> {
        retry_with_backoff("tunes download", self.retry, || {
            self.get_json(&self.tunes_url)
        })
        .await
    }

    pub async fn fetch_aliases(&self) -> Result<Vec<RawAliasRow>, SessionError> {
        retry_with_backoff("aliases download", self.retry, || {
            self.get_json(&self.aliases_url)
        })
        .await
    }

    /// Download both tables concurrently
    pub async fn fetch_tables(&self) -> Result<RawTuneTables, SessionError> {
        let (tunes, aliases) = tokio::try_join!(self.fetch_tunes(), self.fetch_aliases())?;

        tracing::info!(
            tunes = tunes.len(),
            aliases = aliases.len(),
            "Retrieved TheSession tables"
        );

        Ok(RawTuneTables { tunes, aliases })
    }
}
