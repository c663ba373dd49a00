//! Remote schema document retrieval.
//!
//! Fetching is always an explicit call: the validation engine never touches
//! the network. The returned bytes are handed back uninterpreted.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::descriptor::LogSchema;
use crate::error::FetchError;
use crate::obs::{emit_schema_fetch_failed, emit_schema_fetched};

/// Request timeout used when none is configured.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment variable overriding the fetch timeout, in seconds.
pub const FETCH_TIMEOUT_ENV: &str = "WES_LOGSCHEMA_FETCH_TIMEOUT_SECS";

/// Fetcher configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Whole-request timeout (connect, headers and body)
    pub timeout: Duration,
    /// User-Agent header sent with each request
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            timeout: std::env::var(FETCH_TIMEOUT_ENV)
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_FETCH_TIMEOUT),
            user_agent: format!("wes-logschema/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl FetchConfig {
    /// Create a config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP client for schema documents referenced by `schema_uri`.
#[derive(Debug, Clone)]
pub struct SchemaFetcher {
    http_client: reqwest::Client,
}

impl SchemaFetcher {
    /// Build a fetcher with its own HTTP client.
    ///
    /// # Errors
    ///
    /// `FetchError::Transport` if the HTTP client cannot be constructed
    /// (e.g. the TLS backend fails to initialise).
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(|source| FetchError::Transport {
                uri: String::new(),
                source,
            })?;
        Ok(Self { http_client })
    }

    /// Create a fetcher from environment variables
    pub fn from_env() -> Result<Self, FetchError> {
        Self::new(FetchConfig::from_env())
    }

    /// Use a caller-supplied client; its timeout settings apply as-is.
    pub fn with_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    /// GET the schema document at `schema.schema_uri`.
    ///
    /// No retries are attempted; a timeout surfaces as `Transport` (or `Read`
    /// if it hits while the body is streaming).
    pub async fn fetch(&self, schema: &LogSchema) -> Result<Vec<u8>, FetchError> {
        let result = self.fetch_inner(&schema.schema_uri).await;
        match &result {
            Ok(body) => emit_schema_fetched(&schema.schema_uri, body.len()),
            Err(err) => emit_schema_fetch_failed(&schema.schema_uri, err),
        }
        result
    }

    /// Check the descriptor, then fetch its schema document.
    ///
    /// # Errors
    ///
    /// - `LogSchemaError::Descriptor`: the descriptor fails self-validation;
    ///   no request is made.
    /// - `LogSchemaError::Fetch`: the request itself failed.
    pub async fn fetch_checked(&self, schema: &LogSchema) -> crate::Result<Vec<u8>> {
        schema.validate()?;
        Ok(self.fetch(schema).await?)
    }

    async fn fetch_inner(&self, uri: &str) -> Result<Vec<u8>, FetchError> {
        debug!("Fetching schema document from {}", uri);

        let response = self
            .http_client
            .get(uri)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                uri: uri.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                uri: uri.to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(|source| FetchError::Read {
            uri: uri.to_string(),
            source,
        })?;
        Ok(body.to_vec())
    }
}
