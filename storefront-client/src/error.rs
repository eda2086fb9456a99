//! Client error types

use thiserror::Error;

/// Error type for commerce core operations.
///
/// Storage faults never appear here: corrupt or incompatible persisted
/// state is recovered internally by resetting to empty. Network and
/// validation faults always propagate to the immediate caller.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP transport failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    /// Cart mutation named a SKU that is not in the cart
    #[error("no line item with sku {sku}")]
    ItemNotFound { sku: String },

    /// Resource not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Operation requires an authenticated session and none is held
    #[error("authentication required")]
    Unauthorized,

    /// An authenticated call was rejected upstream; the session has
    /// already been torn down by the time the caller sees this
    #[error("session expired")]
    SessionExpired,

    /// Invalid response format
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for commerce core operations
pub type ClientResult<T> = Result<T, ClientError>;
