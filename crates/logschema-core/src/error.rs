//! Error taxonomy for structured-log validation.
//!
//! Validation failures on payloads are never errors: they are reported as
//! data inside a [`crate::ValidationOutcome`]. The types here cover the
//! descriptor self-check reasons and the hard failures of remote fetching.

/// Reasons a `log_schema` descriptor fails its own consistency check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorError {
    #[error("log_schema.schema_uri is required")]
    MissingUri,

    #[error("log_schema.schema_uri must be an absolute HTTP/HTTPS URI, got: {uri:?}")]
    InvalidUriScheme { uri: String },

    #[error("log_schema.format {format:?} is not a recognised value")]
    UnknownFormat { format: String },
}

/// Hard failures while retrieving a remote schema document.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to fetch schema from {uri:?}: {source}")]
    Transport {
        uri: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("schema URI {uri:?} returned HTTP {status}")]
    UnexpectedStatus {
        uri: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to read schema body from {uri:?}: {source}")]
    Read {
        uri: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Library-level errors for callers that combine several operations.
#[derive(Debug, thiserror::Error)]
pub enum LogSchemaError {
    #[error("invalid log_schema: {0}")]
    Descriptor(#[from] DescriptorError),

    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for library operations that can fail hard.
pub type Result<T> = std::result::Result<T, LogSchemaError>;
