use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage misconfigured: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to encode trajectory: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("object store request failed: {0}")]
    Request(String),
}
