//! AIVOICY Error Types
//!
//! Centralized error handling for the dialogue turn pipeline.

use thiserror::Error;

/// Central error type for AIVOICY
#[derive(Error, Debug)]
pub enum VoiceBotError {
    #[error("Microphone permission denied")]
    PermissionDenied,

    #[error("Speech engine error ({code}): {message}")]
    SpeechEngine { code: String, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error: status {status}")]
    Http { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Empty response from model")]
    EmptyResponse,

    #[error("Robot motion backend unavailable")]
    BackendUnavailable,

    #[error("TTS engine error: {0}")]
    Tts(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for AIVOICY operations
pub type BotResult<T> = Result<T, VoiceBotError>;

impl From<reqwest::Error> for VoiceBotError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => VoiceBotError::Http {
                status: status.as_u16(),
                body: String::new(),
            },
            None => VoiceBotError::Network(err.to_string()),
        }
    }
}

/// Helper to convert Mutex poison errors
impl<T> From<std::sync::PoisonError<T>> for VoiceBotError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        VoiceBotError::Storage(err.to_string())
    }
}

impl VoiceBotError {
    /// Whether the failure came from reaching the remote service at all
    /// (HTTP status or transport), as opposed to an unusable payload.
    pub fn is_transport(&self) -> bool {
        matches!(self, VoiceBotError::Network(_) | VoiceBotError::Http { .. })
    }
}
