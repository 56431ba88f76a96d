//! Lesson video player core.
//!
//! Resolves free-form video references, owns the lifecycle of an embedded
//! playback runtime behind the [`player::PlayerRuntime`] seam, and reports
//! per-lesson progress with local resume.

pub mod config;
pub mod constants;
pub mod models;
pub mod player;
pub mod services;
pub mod ui;
pub mod utils;

pub use config::Config;
pub use models::{LessonId, ProgressUpdate, VideoId, resolve_video_id};
pub use player::{PlayerController, PlayerHandle, PlayerLifecycle, PlayerPhase};
pub use ui::pages::player::{CompletionLatch, PlayerView};
