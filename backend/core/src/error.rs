use thiserror::Error;

/// Top-level error type for the Tandem runtime.
#[derive(Debug, Error)]
pub enum TandemError {
    #[error("completion provider error ({provider}): {message}")]
    Provider { provider: String, message: String },

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("profile not found: {0}")]
    ProfileNotFound(String),

    #[error("completion provider runtime not initialized")]
    NotInitialized,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
