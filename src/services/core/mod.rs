/// Stateless service modules
/// These are pure functions that operate on data without maintaining state
pub mod playback;

pub use playback::PlaybackService;
