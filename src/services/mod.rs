pub mod core;
pub mod progress_store;

pub use self::core::PlaybackService;
pub use progress_store::{FileProgressStore, MemoryProgressStore, ProgressStore};
