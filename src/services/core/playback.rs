use tracing::{debug, trace};

use crate::models::{LessonId, PersistedProgress};
use crate::services::progress_store::ProgressStore;
use crate::utils::errors::StoreError;

/// Pure functions for reading and writing resumable positions
pub struct PlaybackService;

impl PlaybackService {
    /// Get the saved position for a lesson
    pub fn get_progress(
        store: &dyn ProgressStore,
        key: &str,
    ) -> Result<Option<PersistedProgress>, StoreError> {
        let Some(raw) = store.get(key)? else {
            return Ok(None);
        };
        let progress: PersistedProgress = serde_json::from_str(&raw)?;
        trace!("Loaded progress for {}: {:?}", key, progress);
        Ok(Some(progress))
    }

    /// Save the current position for a lesson
    pub fn update_progress(
        store: &dyn ProgressStore,
        key: &str,
        lesson_id: &LessonId,
        current_time: f64,
        duration: f64,
    ) -> Result<(), StoreError> {
        let entity = PersistedProgress {
            lesson_id: Some(lesson_id.clone()),
            current_time,
            duration,
            saved_at: chrono::Utc::now().timestamp_millis(),
        };
        let value = serde_json::to_string(&entity)?;
        store.set(key, &value)?;
        debug!("Updated playback progress for lesson: {}", lesson_id);
        Ok(())
    }
}
