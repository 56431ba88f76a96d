//! Host-facing interaction state for the lesson player: the control bar,
//! the interaction shield, keyboard bindings and progress reporting.

pub mod controls_visibility;
pub mod keyboard;
pub mod overlay;
pub mod progress_tracker;
pub mod shield;

pub use controls_visibility::ControlsVisibility;
pub use keyboard::{KeyCommand, PlayerKey};
pub use overlay::{Overlay, PlayerView, format_time};
pub use progress_tracker::{CompletionLatch, ProgressCallback, ProgressTracker};
pub use shield::{InteractionShield, ShieldAction, ShieldGesture};
