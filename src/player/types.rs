//! Common types shared by the lifecycle core and the controller
use crate::constants::{MAX_VOLUME, PLAYBACK_SPEEDS};
use crate::utils::errors::PlayerError;

/// Runtime player states, numbered as the IFrame API reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeState {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
}

impl RuntimeState {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(RuntimeState::Unstarted),
            0 => Some(RuntimeState::Ended),
            1 => Some(RuntimeState::Playing),
            2 => Some(RuntimeState::Paused),
            3 => Some(RuntimeState::Buffering),
            5 => Some(RuntimeState::Cued),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerPhase {
    /// No video reference supplied yet.
    Idle,
    Resolving,
    WaitingForRuntime,
    Initializing,
    Ready,
    Playing,
    Paused,
    Error(PlayerError),
    DomainBlocked,
    Destroyed,
}

impl PlayerPhase {
    /// Phases in which a constructed runtime has reported ready.
    pub fn is_live(&self) -> bool {
        matches!(
            self,
            PlayerPhase::Ready | PlayerPhase::Playing | PlayerPhase::Paused
        )
    }

    pub fn error(&self) -> Option<&PlayerError> {
        match self {
            PlayerPhase::Error(error) => Some(error),
            _ => None,
        }
    }
}

/// What the control bar renders.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub current_time: f64,
    pub duration: f64,
    pub is_playing: bool,
    pub volume: u8,
    pub is_muted: bool,
    pub playback_rate: f64,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            current_time: 0.0,
            duration: 0.0,
            is_playing: false,
            volume: MAX_VOLUME,
            is_muted: false,
            playback_rate: PLAYBACK_SPEEDS[0],
        }
    }
}

impl PlaybackState {
    /// Clamps a target position to the known duration.
    pub fn clamp_position(&self, seconds: f64) -> f64 {
        seconds.clamp(0.0, self.duration.max(0.0))
    }

    /// Volume shown on the slider: muted displays as zero.
    pub fn displayed_volume(&self) -> u8 {
        if self.is_muted { 0 } else { self.volume }
    }
}

/// Cycles through the fixed playback rates, wrapping after the last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpeedCycle {
    index: usize,
}

impl SpeedCycle {
    pub fn current(&self) -> f64 {
        PLAYBACK_SPEEDS[self.index]
    }

    pub fn advance(&mut self) -> f64 {
        self.index = (self.index + 1) % PLAYBACK_SPEEDS.len();
        self.current()
    }

    pub fn label(&self) -> String {
        format!("{}×", self.current())
    }
}

/// Whether the host should suppress the browser's default handling of an
/// input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    PreventDefault,
    Pass,
}
