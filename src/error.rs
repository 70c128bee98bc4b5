//! Error types for the cache adapter

use thiserror::Error;

/// Result type alias for cache adapter operations
pub type Result<T> = std::result::Result<T, CacheError>;

/// Failures reported by a store client binding
#[derive(Error, Debug)]
pub enum StoreError {
    /// HTTP transport error
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Invalid store URL
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Store rejected or failed the command
    #[error("store error: {0}")]
    Server(String),

    /// Response did not match the command protocol
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Client has been disconnected
    #[error("client is disconnected")]
    Disconnected,
}

/// Cache adapter error types
///
/// Failures from the store or the codec propagate unchanged; the adapter
/// performs no retries. The only condition suppressed locally is "key not
/// found" on read, which is a normal `None` result rather than an error.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Value could not be encoded for storage
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// Stored text is not valid encoded data
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// Store client could not be constructed
    #[error("store connection failed: {0}")]
    Connection(#[source] StoreError),

    /// A read against the store failed
    #[error("store read failed: {0}")]
    Read(#[source] StoreError),

    /// A write against the store failed
    #[error("store write failed: {0}")]
    Write(#[source] StoreError),

    /// The namespace sweep failed
    #[error("sweep failed: {0}")]
    Sweep(#[source] StoreError),
}
