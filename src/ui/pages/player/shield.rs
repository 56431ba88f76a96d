use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

/// Pointer gestures landing on the transparent overlay above the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShieldGesture {
    Click,
    DoubleClick,
    ContextMenu,
    DragStart,
    TouchStart,
    Wheel,
}

/// What the lifecycle should do in response to a shield gesture or timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShieldAction {
    Nothing,
    TogglePlay,
    ToggleFullscreen,
}

/// Intercepts interaction with the embedded runtime's own surface so only
/// the custom control bar drives playback.
///
/// A single click toggles play after a debounce window; a second click in
/// that window cancels it, leaving the double-click to toggle fullscreen.
#[derive(Debug, Clone)]
pub struct InteractionShield {
    pending_click: Option<Instant>,
    notice_until: Option<Instant>,
    debounce: Duration,
    notice_duration: Duration,
}

impl InteractionShield {
    pub fn new(debounce: Duration, notice_duration: Duration) -> Self {
        Self {
            pending_click: None,
            notice_until: None,
            debounce,
            notice_duration,
        }
    }

    pub fn handle(&mut self, gesture: ShieldGesture, now: Instant) -> ShieldAction {
        trace!("Shield intercepted {:?}", gesture);
        self.notice_until = Some(now + self.notice_duration);

        match gesture {
            ShieldGesture::Click => {
                if self.pending_click.take().is_none() {
                    self.pending_click = Some(now + self.debounce);
                }
                ShieldAction::Nothing
            }
            ShieldGesture::DoubleClick => {
                self.pending_click = None;
                ShieldAction::ToggleFullscreen
            }
            ShieldGesture::ContextMenu
            | ShieldGesture::DragStart
            | ShieldGesture::TouchStart
            | ShieldGesture::Wheel => ShieldAction::Nothing,
        }
    }

    /// Expires the notice and releases a debounced click whose window closed.
    pub fn fire_due(&mut self, now: Instant) -> ShieldAction {
        if self.notice_until.is_some_and(|until| until <= now) {
            self.notice_until = None;
        }
        match self.pending_click {
            Some(at) if at <= now => {
                self.pending_click = None;
                ShieldAction::TogglePlay
            }
            _ => ShieldAction::Nothing,
        }
    }

    pub fn notice_visible(&self) -> bool {
        self.notice_until.is_some()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.pending_click, self.notice_until) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn reset(&mut self) {
        self.pending_click = None;
        self.notice_until = None;
    }
}
