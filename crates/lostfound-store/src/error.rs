//! Error types for store operations.

/// Errors returned by key-value backends and collection writes.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Key cannot be mapped onto the backend.
    #[error("invalid key: {0}")]
    InvalidKey(String),
}
