use std::fmt;

use thiserror::Error;

/// Failures surfaced to the viewer as inline overlays inside the player frame.
///
/// None of these ever reach the host's progress callback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlayerError {
    #[error("No YouTube link/ID provided for this lesson.")]
    MissingReference,

    #[error("Invalid YouTube video link or ID: {0}")]
    Resolution(String),

    #[error("Failed to initialize YouTube player: {0}")]
    Initialization(String),

    #[error("Unable to load this YouTube video ({0}).")]
    Runtime(RuntimeErrorCode),
}

impl PlayerError {
    /// Only construction failures can be retried, and only after the host
    /// supplies a new reference or remounts the attachment point.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PlayerError::Initialization(_))
    }
}

/// Error codes reported by the embedded runtime's `onError` callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorCode {
    InvalidParameter,
    Html5Playback,
    NotFound,
    EmbeddingForbidden,
    Other(i32),
}

impl From<i32> for RuntimeErrorCode {
    fn from(code: i32) -> Self {
        match code {
            2 => RuntimeErrorCode::InvalidParameter,
            5 => RuntimeErrorCode::Html5Playback,
            100 => RuntimeErrorCode::NotFound,
            101 | 150 => RuntimeErrorCode::EmbeddingForbidden,
            other => RuntimeErrorCode::Other(other),
        }
    }
}

impl fmt::Display for RuntimeErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeErrorCode::InvalidParameter => write!(f, "invalid video ID"),
            RuntimeErrorCode::Html5Playback => write!(f, "playback failed in the browser"),
            RuntimeErrorCode::NotFound => write!(f, "video removed or private"),
            RuntimeErrorCode::EmbeddingForbidden => write!(f, "embedding restricted by owner"),
            RuntimeErrorCode::Other(code) => write!(f, "runtime error {}", code),
        }
    }
}

/// Local progress store failures. The reporter logs and swallows these.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Failures talking to the controller task through a `PlayerHandle`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandleError {
    #[error("Player controller disconnected")]
    Disconnected,

    #[error("Failed to receive response from player controller")]
    NoResponse,
}
