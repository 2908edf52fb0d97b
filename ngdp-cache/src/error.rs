//! Error types for the ngdp-cache crate

use thiserror::Error;

/// Result type for ngdp-cache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cache operations
#[derive(Debug, Error)]
pub enum Error {
    /// Cache directory could not be determined
    #[error("Could not determine cache directory for the current platform")]
    CacheDirectoryNotFound,

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The cache entry was not found
    #[error("Cache entry not found: {0}")]
    CacheEntryNotFound(String),

    /// Invalid cache key provided
    #[error("Invalid cache key: {0}")]
    InvalidCacheKey(String),

    /// Cache corruption detected
    #[error("Cache corruption detected: {0}")]
    CacheCorruption(String),

    /// Ribbit client error
    #[error("Ribbit client error: {0}")]
    RibbitClient(#[from] ribbit_client::Error),

    /// TACT client error
    #[error("TACT client error: {0}")]
    TactClient(#[from] tact_client::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// CDN client error
    #[error("CDN client error: {0}")]
    CdnClient(#[from] ngdp_cdn::Error),

    /// UTF-8 conversion error
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// A transport has no equivalent of the requested endpoint
    #[error("endpoint {0} is not supported by this transport")]
    UnsupportedEndpoint(&'static str),

    /// A committed object's content did not hash to its expected key
    #[error("integrity check failed for {key}: expected {expected}, got {actual}")]
    IntegrityError {
        key: String,
        expected: String,
        actual: String,
    },

    /// No cached or fetchable entry exists for the requested key
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    /// A product config named a decryption key that isn't loaded
    #[error("missing decryption key: {0}")]
    MissingKey(String),

    /// TACT parser error
    #[error("TACT parser error: {0}")]
    TactParser(#[from] tact_parser::Error),
}
