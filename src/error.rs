//! Aura Error Types
//!
//! Centralized error handling for the assistant.

use thiserror::Error;

/// Central error type for Aura
#[derive(Error, Debug)]
pub enum AuraError {
    #[error("Speech recognition error: {0}")]
    Recognizer(String),

    #[error("Speech synthesis error: {0}")]
    Synthesizer(String),

    #[error("Speech synthesizer is busy")]
    SynthesizerBusy,

    #[error("Audio device error: {0}")]
    Audio(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Handler error: {0}")]
    Handler(String),

    #[error("Worker error: {0}")]
    Worker(String),

    #[error("Lock poisoned: {0}")]
    Lock(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Wav(#[from] hound::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for Aura operations
pub type AuraResult<T> = Result<T, AuraError>;

/// Helper to convert Mutex poison errors
impl<T> From<std::sync::PoisonError<T>> for AuraError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        AuraError::Lock(err.to_string())
    }
}
