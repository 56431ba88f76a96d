// Player tuning defaults. Config values fall back to these.

/// Playback rates offered by the speed button, in cycling order.
pub const PLAYBACK_SPEEDS: [f64; 5] = [1.0, 1.25, 1.5, 1.75, 2.0];

// === Progress ===
pub const PROGRESS_INTERVAL_MS: u64 = 1000;
pub const COMPLETION_THRESHOLD: f64 = 0.95;
/// Saved positions this close to the end are not resumed.
pub const RESUME_TAIL_SECS: f64 = 5.0;
pub const PROGRESS_KEY_PREFIX: &str = "progress:";

// === Controls ===
pub const SEEK_STEP_SECS: f64 = 5.0;
pub const VOLUME_STEP: u8 = 5;
pub const MAX_VOLUME: u8 = 100;
pub const CLICK_DEBOUNCE_MS: u64 = 200;
pub const SHIELD_NOTICE_MS: u64 = 1300;
pub const CONTROLS_HIDE_DELAY_MS: u64 = 3000;

// === Runtime ===
/// Retry period while waiting for the attachment point to appear.
pub const READINESS_POLL_MS: u64 = 100;
pub const EMBED_HOST: &str = "https://www.youtube-nocookie.com";
pub const DEFAULT_ALLOWED_DOMAINS: [&str; 3] = ["your-lms-domain.com", "localhost", "127.0.0.1"];
