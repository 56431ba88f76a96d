use std::time::Duration;

use tokio::time::Instant;

/// Control visibility state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ControlState {
    /// Control bar is hidden
    Hidden,
    /// Control bar is visible, optionally with an inactivity deadline
    Visible { hide_at: Option<Instant> },
}

/// Tracks whether the custom control bar is shown.
#[derive(Debug, Clone)]
pub struct ControlsVisibility {
    state: ControlState,
    hide_delay: Duration,
}

impl ControlsVisibility {
    pub fn new(hide_delay: Duration) -> Self {
        Self {
            state: ControlState::Visible { hide_at: None },
            hide_delay,
        }
    }

    /// Transition to the Visible state with no pending hide
    pub fn show(&mut self) {
        self.state = ControlState::Visible { hide_at: None };
    }

    /// Transition to the Visible state and start the inactivity timer
    pub fn show_then_hide(&mut self, now: Instant) {
        self.state = ControlState::Visible {
            hide_at: Some(now + self.hide_delay),
        };
    }

    /// Start the inactivity timer without revealing hidden controls
    pub fn schedule_hide(&mut self, now: Instant) {
        if let ControlState::Visible { hide_at } = &mut self.state {
            *hide_at = Some(now + self.hide_delay);
        }
    }

    /// Transition to the Hidden state
    pub fn hide(&mut self) {
        self.state = ControlState::Hidden;
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self.state, ControlState::Hidden)
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            ControlState::Visible { hide_at } => hide_at,
            ControlState::Hidden => None,
        }
    }

    /// Hides the controls if the inactivity deadline has passed. Controls
    /// stay up (and the timer is dropped) when playback is not running.
    pub fn fire_due(&mut self, now: Instant, playing: bool) {
        let Some(hide_at) = self.deadline() else {
            return;
        };
        if hide_at > now {
            return;
        }
        if playing {
            self.hide();
        } else {
            self.show();
        }
    }
}
