use std::sync::Arc;

use tracing::debug;

use crate::config::PlayerConfig;
use crate::models::{LessonId, ProgressUpdate};
use crate::services::{PlaybackService, ProgressStore};

/// Host callback receiving one update per progress tick.
pub type ProgressCallback = Box<dyn FnMut(ProgressUpdate) + Send>;

/// Persists resumable positions and reports progress for the current lesson.
pub struct ProgressTracker {
    store: Arc<dyn ProgressStore>,
    key_prefix: String,
    target: Option<(LessonId, String)>,
    on_progress: ProgressCallback,
    /// Fraction of the duration at which a lesson counts as completed
    completion_threshold: f64,
    /// Saved positions this close to the end start over instead
    resume_tail_secs: f64,
}

impl ProgressTracker {
    pub fn new(
        store: Arc<dyn ProgressStore>,
        key_prefix: impl Into<String>,
        config: &PlayerConfig,
        on_progress: ProgressCallback,
    ) -> Self {
        Self {
            store,
            key_prefix: key_prefix.into(),
            target: None,
            on_progress,
            completion_threshold: config.completion_threshold,
            resume_tail_secs: config.resume_tail_secs,
        }
    }

    /// Point the tracker at a lesson; later reads and writes use its key.
    pub fn set_lesson(&mut self, lesson_id: &LessonId) {
        let key = lesson_id.storage_key(&self.key_prefix);
        self.target = Some((lesson_id.clone(), key));
    }

    pub fn key(&self) -> Option<&str> {
        self.target.as_ref().map(|(_, key)| key.as_str())
    }

    /// Check if we should resume from saved position
    pub fn should_resume(&self, saved_position: f64, duration: f64) -> bool {
        saved_position.is_finite()
            && saved_position > 0.0
            && saved_position < duration - self.resume_tail_secs
    }

    pub fn is_complete(&self, current_time: f64, duration: f64) -> bool {
        duration > 0.0 && current_time / duration >= self.completion_threshold
    }

    /// Saved position to seek to once the runtime reports `duration`.
    ///
    /// Falls back to the persisted duration while the runtime has none yet.
    /// Unreadable entries are treated as absent.
    pub fn resume_position(&self, duration: f64) -> Option<f64> {
        let (_, key) = self.target.as_ref()?;
        match PlaybackService::get_progress(self.store.as_ref(), key) {
            Ok(Some(saved)) => {
                let duration = if duration > 0.0 { duration } else { saved.duration };
                self.should_resume(saved.current_time, duration)
                    .then_some(saved.current_time)
            }
            Ok(None) => None,
            Err(e) => {
                debug!("Ignoring unreadable saved progress for {}: {}", key, e);
                None
            }
        }
    }

    /// Persist the position, then report it to the host.
    pub fn record(&mut self, current_time: f64, duration: f64) -> ProgressUpdate {
        if let Some((lesson_id, key)) = &self.target
            && let Err(e) = PlaybackService::update_progress(
                self.store.as_ref(),
                key,
                lesson_id,
                current_time,
                duration,
            )
        {
            debug!("Failed to persist progress for {}: {}", key, e);
        }

        let update = ProgressUpdate {
            current_time,
            duration,
            completed: self.is_complete(current_time, duration),
        };
        (self.on_progress)(update);
        update
    }
}

impl std::fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("key", &self.key())
            .field("completion_threshold", &self.completion_threshold)
            .field("resume_tail_secs", &self.resume_tail_secs)
            .finish()
    }
}

/// Host-side helper that reports completion once per lesson.
///
/// Fires only for the first completed update, and never if the lesson was
/// already marked complete when the latch was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionLatch {
    completed: bool,
}

impl CompletionLatch {
    pub fn new(already_completed: bool) -> Self {
        Self {
            completed: already_completed,
        }
    }

    /// Returns true exactly when this update should mark the lesson complete.
    pub fn observe(&mut self, update: &ProgressUpdate) -> bool {
        if update.completed && !self.completed {
            self.completed = true;
            return true;
        }
        false
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }
}
