mod identifiers;
pub mod video;

pub use identifiers::LessonId;
pub use video::{ThumbnailQuality, VideoId, parse_iso8601_duration, resolve_video_id};

use serde::{Deserialize, Serialize};

/// One progress observation handed to the host's `on_progress` callback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub current_time: f64,
    pub duration: f64,
    pub completed: bool,
}

/// Resumable position stored locally per lesson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedProgress {
    #[serde(default)]
    pub lesson_id: Option<LessonId>,
    #[serde(alias = "t")]
    pub current_time: f64,
    #[serde(alias = "d")]
    pub duration: f64,
    /// Epoch milliseconds.
    #[serde(alias = "at")]
    pub saved_at: i64,
}
