use thiserror::Error;

/// Error for token persistence operations
#[derive(Debug, Clone, Error)]
pub enum TokenStoreError {
    #[error("Token storage I/O failed: {0}")]
    Io(String),

    #[error("Token storage is corrupt: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for TokenStoreError {
    fn from(err: std::io::Error) -> Self {
        TokenStoreError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TokenStoreError {
    fn from(err: serde_json::Error) -> Self {
        TokenStoreError::Serialization(err.to_string())
    }
}
