use crate::player::{PlaybackState, PlayerPhase};

pub const BLOCKED_TEXT: &str = "Playback blocked on this domain.";
pub const AWAITING_TEXT: &str = "No YouTube link/ID provided for this lesson.";
pub const WAITING_TEXT: &str = "Waiting for video…";
pub const LOADING_TEXT: &str = "Loading YouTube video…";
pub const NOTICE_TEXT: &str = "Interactions disabled. Use controls below.";

/// Full-surface overlay drawn above the player, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    DomainBlocked,
    AwaitingVideo,
    Error(String),
    Waiting,
    Loading,
    None,
}

impl Overlay {
    pub fn for_phase(phase: &PlayerPhase) -> Self {
        match phase {
            PlayerPhase::DomainBlocked => Overlay::DomainBlocked,
            PlayerPhase::Idle => Overlay::AwaitingVideo,
            PlayerPhase::Error(e) => Overlay::Error(e.to_string()),
            PlayerPhase::WaitingForRuntime => Overlay::Waiting,
            PlayerPhase::Resolving | PlayerPhase::Initializing => Overlay::Loading,
            PlayerPhase::Ready
            | PlayerPhase::Playing
            | PlayerPhase::Paused
            | PlayerPhase::Destroyed => Overlay::None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Overlay::DomainBlocked => Some(BLOCKED_TEXT),
            Overlay::AwaitingVideo => Some(AWAITING_TEXT),
            Overlay::Error(message) => Some(message),
            Overlay::Waiting => Some(WAITING_TEXT),
            Overlay::Loading => Some(LOADING_TEXT),
            Overlay::None => None,
        }
    }
}

/// Snapshot of everything the host renders for one player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerView {
    pub phase: PlayerPhase,
    pub overlay: Overlay,
    pub playback: PlaybackState,
    /// Slider value; zero while muted
    pub displayed_volume: u8,
    pub speed_label: String,
    pub position_label: String,
    pub duration_label: String,
    pub controls_visible: bool,
    /// Transport buttons are inert until the runtime is ready
    pub controls_enabled: bool,
    pub notice_visible: bool,
    /// Poster shown until the first play
    pub thumbnail_url: Option<String>,
    pub show_play_icon: bool,
    pub watermark: Option<String>,
}

impl PlayerView {
    /// The only thing drawn on a blocked host.
    pub fn blocked(playback: PlaybackState) -> Self {
        Self {
            phase: PlayerPhase::DomainBlocked,
            overlay: Overlay::DomainBlocked,
            displayed_volume: playback.displayed_volume(),
            playback,
            speed_label: String::new(),
            position_label: format_time(0.0),
            duration_label: format_time(0.0),
            controls_visible: false,
            controls_enabled: false,
            notice_visible: false,
            thumbnail_url: None,
            show_play_icon: false,
            watermark: None,
        }
    }
}

pub fn watermark_text(lesson_id: &str) -> String {
    format!("LMS • Lesson #{}", lesson_id)
}

/// Formats seconds as `h:mm:ss`, or `m:ss` under an hour.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total_secs = seconds.floor() as u64;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}
