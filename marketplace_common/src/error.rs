//! Error types for marketplace stock sync

use thiserror::Error;

/// Unified error type for sync operations
#[derive(Debug, Error)]
pub enum SyncError {
    /// Malformed feed row or unreadable feed file
    ///
    /// `location` points at the offending input, e.g. `line 18` or `SKU A-1`.
    #[error("Feed parse error ({location}): {reason}")]
    FeedParse { location: String, reason: String },

    /// Price that cannot be cleaned into a positive integer
    #[error("Invalid price for SKU {sku}: {raw:?}")]
    PriceFormat { sku: String, raw: String },

    /// HTTP request failed (connection, timeout, body decoding)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Marketplace answered with a non-success status
    #[error("HTTP error {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Marketplace throttled the request (HTTP 429)
    #[error("Rate limited by marketplace (retry after: {retry_after:?}s)")]
    RateLimited { retry_after: Option<u64> },

    /// Stock archive could not be opened or lacks the stock file
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse JSON response
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SyncError {
    /// Whether re-sending the same request later may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            SyncError::Network(_) | SyncError::RateLimited { .. } => true,
            SyncError::HttpStatus { status, .. } => status.is_server_error(),
            _ => false,
        }
    }
}

/// Result alias for sync operations
pub type Result<T> = std::result::Result<T, SyncError>;
