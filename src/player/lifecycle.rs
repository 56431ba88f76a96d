use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info, trace, warn};

use super::init_lock::InitLock;
use super::traits::{
    HostDocument, PlayerRuntime, RuntimeEnvelope, RuntimeEvent, RuntimeEventSink,
    RuntimeInstance, RuntimeOptions,
};
use super::types::{Disposition, PlaybackState, PlayerPhase, RuntimeState, SpeedCycle};
use crate::config::{Config, PlayerConfig};
use crate::constants::MAX_VOLUME;
use crate::models::{LessonId, ProgressUpdate, ThumbnailQuality, VideoId, resolve_video_id};
use crate::services::ProgressStore;
use crate::ui::pages::player::keyboard::{self, KeyCommand, PlayerKey};
use crate::ui::pages::player::overlay::watermark_text;
use crate::ui::pages::player::{
    ControlsVisibility, InteractionShield, Overlay, PlayerView, ProgressCallback,
    ProgressTracker, ShieldAction, ShieldGesture, format_time,
};
use crate::utils::errors::{PlayerError, RuntimeErrorCode};

struct LiveInstance {
    generation: u64,
    handle: Box<dyn RuntimeInstance>,
}

/// Synchronous core of one lesson player.
///
/// Owns the runtime instance for a single attachment point and enforces the
/// lifecycle rules: at most one live instance, teardown before rebuild, and
/// no events from a destroyed instance reaching playback state. Timers are
/// expressed as deadlines; the [`PlayerController`](super::PlayerController)
/// drives them.
pub struct PlayerLifecycle {
    config: PlayerConfig,
    runtime: Arc<dyn PlayerRuntime>,
    document: Arc<dyn HostDocument>,
    tracker: ProgressTracker,
    events: mpsc::UnboundedSender<RuntimeEnvelope>,
    lock: InitLock,
    instance: Option<LiveInstance>,
    last_generation: u64,
    phase: PlayerPhase,
    playback: PlaybackState,
    speed: SpeedCycle,
    reference: Option<String>,
    lesson_id: Option<LessonId>,
    video_id: Option<VideoId>,
    mounted: bool,
    runtime_available: bool,
    domain_blocked: bool,
    has_played: bool,
    polling: Option<u64>,
    polling_epoch: u64,
    controls: ControlsVisibility,
    shield: InteractionShield,
}

impl PlayerLifecycle {
    pub fn new(
        config: &Config,
        runtime: Arc<dyn PlayerRuntime>,
        document: Arc<dyn HostDocument>,
        store: Arc<dyn ProgressStore>,
        on_progress: ProgressCallback,
        events: mpsc::UnboundedSender<RuntimeEnvelope>,
    ) -> Self {
        let player = config.player.clone();
        let tracker =
            ProgressTracker::new(store, config.storage.key_prefix.clone(), &player, on_progress);
        let controls = ControlsVisibility::new(player.controls_hide_delay());
        let shield = InteractionShield::new(player.click_debounce(), player.notice_duration());

        Self {
            config: player,
            runtime,
            document,
            tracker,
            events,
            lock: InitLock::new(),
            instance: None,
            last_generation: 0,
            phase: PlayerPhase::Idle,
            playback: PlaybackState::default(),
            speed: SpeedCycle::default(),
            reference: None,
            lesson_id: None,
            video_id: None,
            mounted: false,
            runtime_available: false,
            domain_blocked: false,
            has_played: false,
            polling: None,
            polling_epoch: 0,
            controls,
            shield,
        }
    }

    pub fn phase(&self) -> &PlayerPhase {
        &self.phase
    }

    pub fn playback(&self) -> &PlaybackState {
        &self.playback
    }

    pub fn video_id(&self) -> Option<&VideoId> {
        self.video_id.as_ref()
    }

    pub fn lesson_id(&self) -> Option<&LessonId> {
        self.lesson_id.as_ref()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Generation of the live runtime instance, if one exists.
    pub fn instance_generation(&self) -> Option<u64> {
        self.instance.as_ref().map(|live| live.generation)
    }

    /// Changes whenever progress polling (re)starts; `None` while stopped.
    pub fn polling_epoch(&self) -> Option<u64> {
        self.polling
    }

    pub fn progress_interval(&self) -> Duration {
        self.config.progress_interval()
    }

    pub fn readiness_interval(&self) -> Duration {
        self.config.readiness_poll()
    }

    /// True while construction is only held up by the host document, so the
    /// driver should keep re-checking for the attachment point.
    pub fn awaiting_attachment(&self) -> bool {
        self.phase == PlayerPhase::WaitingForRuntime
            && self.mounted
            && self.runtime_available
            && !self.domain_blocked
            && self.instance.is_none()
            && !self.lock.is_held()
    }

    /// Attach to the host page.
    ///
    /// A fresh mount checks the hostname allowlist and (re)resolves the current
    /// source. Mounting while already mounted acts as a readiness poll.
    pub fn mount(&mut self) {
        if self.mounted {
            self.poll_readiness();
            return;
        }
        self.mounted = true;

        let hostname = self.document.hostname();
        self.domain_blocked = self.config.blocks_host(hostname.as_deref());
        if self.domain_blocked {
            warn!("Playback blocked on host {:?}", hostname);
        }
        self.reset_and_resolve();
    }

    /// Detach from the host page and release the runtime instance.
    pub fn unmount(&mut self) {
        if !self.mounted && self.instance.is_none() {
            return;
        }
        debug!("Unmounting lesson player");
        self.teardown();
        self.mounted = false;
        self.phase = PlayerPhase::Destroyed;
    }

    /// Supply a new video reference for a lesson. Any existing instance is
    /// torn down before the new one is built.
    pub fn set_source(&mut self, reference: Option<String>, lesson_id: LessonId) {
        debug!("Source for lesson {} set to {:?}", lesson_id, reference);
        self.tracker.set_lesson(&lesson_id);
        self.reference = reference;
        self.lesson_id = Some(lesson_id);
        if self.mounted {
            self.reset_and_resolve();
        }
    }

    /// The runtime's availability signal fired.
    pub fn runtime_available(&mut self) {
        self.runtime_available = true;
        self.try_initialize();
    }

    /// Retry initialization if every precondition now holds.
    pub fn poll_readiness(&mut self) -> bool {
        self.try_initialize()
    }

    fn reset_and_resolve(&mut self) {
        self.teardown();
        self.playback = PlaybackState {
            playback_rate: self.speed.current(),
            ..PlaybackState::default()
        };
        self.has_played = false;
        self.video_id = None;

        if self.domain_blocked {
            self.phase = PlayerPhase::DomainBlocked;
            return;
        }

        self.phase = PlayerPhase::Resolving;
        let Some(reference) = self.reference.as_deref() else {
            self.phase = PlayerPhase::Idle;
            return;
        };
        if reference.trim().is_empty() {
            self.phase = PlayerPhase::Error(PlayerError::MissingReference);
            return;
        }

        match resolve_video_id(Some(reference)) {
            Some(video_id) => {
                debug!("Resolved {:?} to video {}", reference, video_id.as_str());
                self.video_id = Some(video_id);
                self.phase = PlayerPhase::WaitingForRuntime;
                self.try_initialize();
            }
            None => {
                info!("Could not resolve a video from {:?}", reference);
                self.phase = PlayerPhase::Error(PlayerError::Resolution(reference.to_string()));
            }
        }
    }

    fn try_initialize(&mut self) -> bool {
        if self.phase != PlayerPhase::WaitingForRuntime
            || !self.mounted
            || !self.runtime_available
            || self.domain_blocked
        {
            return false;
        }
        let (Some(lesson_id), Some(video_id)) = (&self.lesson_id, &self.video_id) else {
            return false;
        };

        let attachment_id = lesson_id.attachment_id();
        if !self.document.attachment_present(&attachment_id) {
            trace!("Attachment point {} not present yet", attachment_id);
            return false;
        }

        let generation = self.last_generation + 1;
        if !self.lock.try_acquire(generation) {
            trace!("Initialization already in progress for {}", attachment_id);
            return false;
        }
        self.last_generation = generation;
        self.phase = PlayerPhase::Initializing;

        let options = RuntimeOptions::locked_down(
            video_id.clone(),
            &self.config.embed_host,
            self.document.origin(),
        );
        let sink = RuntimeEventSink::new(generation, self.events.clone());

        match self.runtime.construct(&attachment_id, options, sink) {
            Ok(handle) => {
                info!(
                    "Constructed runtime instance {} in {}",
                    generation, attachment_id
                );
                self.instance = Some(LiveInstance { generation, handle });
                true
            }
            Err(e) => {
                error!("Failed to construct runtime instance: {:#}", e);
                self.lock.release();
                self.phase = PlayerPhase::Error(PlayerError::Initialization(format!("{:#}", e)));
                false
            }
        }
    }

    /// Stop polling, destroy the instance if it attached, release the lock
    /// and cancel pending interaction timers. In that order.
    fn teardown(&mut self) {
        self.stop_polling();

        if let Some(mut live) = self.instance.take() {
            if live.handle.has_output() {
                live.handle.destroy();
                info!("Destroyed runtime instance {}", live.generation);
            } else {
                debug!(
                    "Dropping runtime instance {} before it attached",
                    live.generation
                );
            }
        }

        self.lock.release();
        self.shield.reset();
        self.controls.show();
    }

    fn start_polling(&mut self) {
        self.polling_epoch += 1;
        self.polling = Some(self.polling_epoch);
        trace!("Progress polling started (epoch {})", self.polling_epoch);
    }

    fn stop_polling(&mut self) {
        if self.polling.take().is_some() {
            trace!("Progress polling stopped");
        }
    }

    pub fn handle_runtime_event(&mut self, envelope: RuntimeEnvelope, now: Instant) {
        let current = self.instance_generation();
        if current != Some(envelope.generation) {
            debug!(
                "Ignoring {:?} from stale runtime instance {} (current {:?})",
                envelope.event, envelope.generation, current
            );
            return;
        }

        match envelope.event {
            RuntimeEvent::Ready => self.on_ready(),
            RuntimeEvent::StateChanged(state) => self.on_state_changed(state, now),
            RuntimeEvent::Error(code) => self.on_runtime_error(code),
        }
    }

    fn on_ready(&mut self) {
        if self.phase != PlayerPhase::Initializing {
            trace!("Ready received in phase {:?}", self.phase);
            return;
        }
        let Some(live) = self.instance.as_mut() else {
            return;
        };
        let handle = &mut live.handle;

        let duration = handle.duration().filter(|d| d.is_finite()).unwrap_or(0.0);
        self.playback.duration = duration;
        self.playback.volume = handle.volume().min(MAX_VOLUME);
        self.playback.is_muted = handle.is_muted();

        if let Some(position) = self.tracker.resume_position(duration) {
            info!("Resuming lesson at {:.1}s", position);
            handle.seek_to(position);
            self.playback.current_time = position;
        }

        let rate = self.speed.current();
        handle.set_playback_rate(rate);
        self.playback.playback_rate = rate;

        self.phase = PlayerPhase::Ready;
        self.start_polling();
    }

    fn on_state_changed(&mut self, state: RuntimeState, now: Instant) {
        if !self.phase.is_live() {
            trace!("State {:?} received in phase {:?}", state, self.phase);
            return;
        }

        match state {
            RuntimeState::Playing => {
                self.phase = PlayerPhase::Playing;
                self.playback.is_playing = true;
                self.has_played = true;
                self.controls.schedule_hide(now);
            }
            RuntimeState::Unstarted | RuntimeState::Cued => {
                self.phase = PlayerPhase::Ready;
                self.playback.is_playing = false;
                self.controls.show();
            }
            RuntimeState::Paused | RuntimeState::Buffering | RuntimeState::Ended => {
                self.phase = PlayerPhase::Paused;
                self.playback.is_playing = false;
                self.controls.show();
            }
        }
    }

    fn on_runtime_error(&mut self, code: i32) {
        let code = RuntimeErrorCode::from(code);
        warn!("Runtime reported playback error: {}", code);
        self.stop_polling();
        self.playback.is_playing = false;
        self.controls.show();
        self.phase = PlayerPhase::Error(PlayerError::Runtime(code));
    }

    /// One progress tick: read position and duration, persist, report.
    pub fn poll_progress(&mut self) -> Option<ProgressUpdate> {
        self.polling?;
        let live = self.instance.as_ref()?;
        let current_time = live.handle.current_time().filter(|t| t.is_finite())?;
        let duration = live.handle.duration().filter(|d| d.is_finite())?;

        self.playback.current_time = current_time;
        self.playback.duration = duration;
        Some(self.tracker.record(current_time, duration))
    }

    fn controls_enabled(&self) -> bool {
        self.phase.is_live() && !self.domain_blocked && self.instance.is_some()
    }

    fn transport(&mut self) -> Option<&mut Box<dyn RuntimeInstance>> {
        if !self.controls_enabled() {
            return None;
        }
        self.instance.as_mut().map(|live| &mut live.handle)
    }

    pub fn toggle_play(&mut self) {
        let playing = self.playback.is_playing;
        let Some(handle) = self.transport() else {
            return;
        };
        if playing {
            handle.pause();
        } else {
            handle.play();
        }
    }

    /// Seek to an absolute position, clamped to the known duration.
    pub fn seek(&mut self, seconds: f64) {
        if !seconds.is_finite() {
            return;
        }
        let target = self.playback.clamp_position(seconds);
        let Some(handle) = self.transport() else {
            return;
        };
        handle.seek_to(target);
        self.playback.current_time = target;
    }

    pub fn set_volume(&mut self, volume: u8) {
        let volume = volume.min(MAX_VOLUME);
        let muted = self.playback.is_muted;
        let Some(handle) = self.transport() else {
            return;
        };
        handle.set_volume(volume);
        if muted && volume > 0 {
            handle.un_mute();
        }
        self.playback.volume = volume;
        self.playback.is_muted = volume == 0;
    }

    pub fn toggle_mute(&mut self) {
        let muted = self.playback.is_muted;
        let Some(handle) = self.transport() else {
            return;
        };
        if muted {
            handle.un_mute();
            let volume = handle.volume().min(MAX_VOLUME);
            self.playback.volume = volume;
            self.playback.is_muted = false;
        } else {
            handle.mute();
            self.playback.is_muted = true;
        }
    }

    /// Advance to the next playback rate. Returns the new rate if applied.
    pub fn cycle_speed(&mut self) -> Option<f64> {
        if !self.controls_enabled() {
            return None;
        }
        let rate = self.speed.advance();
        if let Some(handle) = self.transport() {
            handle.set_playback_rate(rate);
        }
        self.playback.playback_rate = rate;
        debug!("Playback rate set to {}", rate);
        Some(rate)
    }

    /// Enter or leave fullscreen on the player container.
    pub fn toggle_fullscreen(&mut self) -> bool {
        if !self.controls_enabled() {
            return false;
        }
        let result = if self.document.fullscreen_active() {
            self.document.exit_fullscreen()
        } else {
            self.document.request_fullscreen()
        };
        if let Err(e) = result {
            warn!("Fullscreen toggle rejected: {}", e);
            return false;
        }
        true
    }

    /// Pointer input on the interaction shield. Always suppresses the
    /// browser default.
    pub fn handle_shield(&mut self, gesture: ShieldGesture, now: Instant) -> Disposition {
        if self.domain_blocked {
            return Disposition::PreventDefault;
        }
        match self.shield.handle(gesture, now) {
            ShieldAction::ToggleFullscreen => {
                self.toggle_fullscreen();
            }
            ShieldAction::TogglePlay => self.toggle_play(),
            ShieldAction::Nothing => {}
        }
        Disposition::PreventDefault
    }

    /// Keyboard input while the player container holds focus.
    pub fn handle_key(&mut self, key: PlayerKey, focused: bool) -> Disposition {
        if !focused || self.domain_blocked {
            return Disposition::Pass;
        }
        let Some(command) = keyboard::command_for(key) else {
            return Disposition::Pass;
        };

        let step = self.config.seek_step_secs;
        let volume_step = self.config.volume_step;
        match command {
            KeyCommand::TogglePlay => self.toggle_play(),
            KeyCommand::ToggleMute => self.toggle_mute(),
            KeyCommand::ToggleFullscreen => {
                self.toggle_fullscreen();
            }
            KeyCommand::SeekBackward => self.seek(self.playback.current_time - step),
            KeyCommand::SeekForward => self.seek(self.playback.current_time + step),
            KeyCommand::VolumeUp => {
                self.set_volume(self.playback.volume.saturating_add(volume_step))
            }
            KeyCommand::VolumeDown => {
                self.set_volume(self.playback.volume.saturating_sub(volume_step))
            }
        }
        Disposition::PreventDefault
    }

    pub fn pointer_moved(&mut self, now: Instant) {
        if self.playback.is_playing {
            self.controls.show_then_hide(now);
        } else {
            self.controls.show();
        }
    }

    pub fn pointer_left(&mut self) {
        if self.playback.is_playing {
            self.controls.hide();
        }
    }

    /// Run every interaction timer whose deadline has passed.
    pub fn fire_due_timers(&mut self, now: Instant) {
        if self.shield.fire_due(now) == ShieldAction::TogglePlay {
            self.toggle_play();
        }
        self.controls.fire_due(now, self.playback.is_playing);
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.shield.next_deadline(), self.controls.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn view(&self) -> PlayerView {
        if self.domain_blocked {
            return PlayerView::blocked(self.playback.clone());
        }

        let overlay = Overlay::for_phase(&self.phase);
        let thumbnail_url = self
            .video_id
            .as_ref()
            .filter(|_| !self.has_played)
            .map(|id| id.thumbnail_url(ThumbnailQuality::default()));

        PlayerView {
            phase: self.phase.clone(),
            show_play_icon: self.video_id.is_some()
                && !self.playback.is_playing
                && overlay == Overlay::None,
            overlay,
            displayed_volume: self.playback.displayed_volume(),
            speed_label: self.speed.label(),
            position_label: format_time(self.playback.current_time),
            duration_label: format_time(self.playback.duration),
            controls_visible: self.controls.is_visible(),
            controls_enabled: self.controls_enabled(),
            notice_visible: self.shield.notice_visible(),
            thumbnail_url,
            watermark: self.lesson_id.as_ref().map(|id| watermark_text(id.as_str())),
            playback: self.playback.clone(),
        }
    }
}

impl Drop for PlayerLifecycle {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for PlayerLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerLifecycle")
            .field("phase", &self.phase)
            .field("lesson_id", &self.lesson_id)
            .field("video_id", &self.video_id)
            .field("generation", &self.instance_generation())
            .field("mounted", &self.mounted)
            .finish()
    }
}
