use std::time::Duration;

/// Rejections raised before any request is built or sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Unknown aspect ratio '{ratio}' for model {model}")]
    UnknownAspectRatio { model: String, ratio: String },

    #[error("Invalid secret key")]
    AuthMismatch,

    #[error("Invalid image count {requested}: expected 1..={max}")]
    InvalidImageCount { requested: usize, max: usize },
}

/// Why a single generation call produced no image.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationFailure {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Inference proxy returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, thiserror::Error)]
pub enum NicheError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Request error: {0}")]
    RequestError(String),

    #[error("Response error: {0}")]
    ResponseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

pub type Result<T> = std::result::Result<T, NicheError>;
