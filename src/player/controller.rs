use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, trace};

use super::lifecycle::PlayerLifecycle;
use super::traits::{HostDocument, PlayerRuntime, RuntimeEnvelope};
use super::types::{Disposition, PlayerPhase};
use crate::config::Config;
use crate::models::LessonId;
use crate::services::ProgressStore;
use crate::ui::pages::player::{PlayerKey, PlayerView, ProgressCallback, ShieldGesture};
use crate::utils::errors::HandleError;

/// Commands that can be sent to the player controller
#[derive(Debug)]
pub enum PlayerCommand {
    /// Attach to the host page
    Mount {
        respond_to: oneshot::Sender<PlayerPhase>,
    },
    /// Detach and destroy the runtime instance
    Unmount { respond_to: oneshot::Sender<()> },
    /// Supply the video reference for a lesson
    SetSource {
        reference: Option<String>,
        lesson_id: LessonId,
        respond_to: oneshot::Sender<PlayerPhase>,
    },
    /// Re-check initialization preconditions
    PollReadiness { respond_to: oneshot::Sender<bool> },
    TogglePlay { respond_to: oneshot::Sender<()> },
    /// Seek to an absolute position in seconds
    Seek {
        position: f64,
        respond_to: oneshot::Sender<()>,
    },
    /// Set volume (0 to 100)
    SetVolume {
        volume: u8,
        respond_to: oneshot::Sender<()>,
    },
    ToggleMute { respond_to: oneshot::Sender<()> },
    /// Advance to the next playback rate
    CycleSpeed {
        respond_to: oneshot::Sender<Option<f64>>,
    },
    ToggleFullscreen { respond_to: oneshot::Sender<bool> },
    /// Pointer gesture on the interaction shield
    Shield {
        gesture: ShieldGesture,
        respond_to: oneshot::Sender<Disposition>,
    },
    /// Key press, with whether the player container holds focus
    Key {
        key: PlayerKey,
        focused: bool,
        respond_to: oneshot::Sender<Disposition>,
    },
    /// Pointer moved over the player (fire-and-forget)
    PointerMoved,
    /// Pointer left the player (fire-and-forget)
    PointerLeft,
    /// Snapshot of the render state
    GetView {
        respond_to: oneshot::Sender<PlayerView>,
    },
}

/// Owns a [`PlayerLifecycle`] and drives its timers, runtime events and the
/// availability signal from a single task.
pub struct PlayerController {
    lifecycle: PlayerLifecycle,
    runtime: Arc<dyn PlayerRuntime>,
    receiver: mpsc::UnboundedReceiver<PlayerCommand>,
    runtime_events: mpsc::UnboundedReceiver<RuntimeEnvelope>,
    progress_timer: Option<(u64, Interval)>,
    readiness_timer: Option<Interval>,
}

impl PlayerController {
    pub fn new(
        config: &Config,
        runtime: Arc<dyn PlayerRuntime>,
        document: Arc<dyn HostDocument>,
        store: Arc<dyn ProgressStore>,
        on_progress: ProgressCallback,
    ) -> (PlayerHandle, Self) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (events_tx, runtime_events) = mpsc::unbounded_channel();

        let lifecycle =
            PlayerLifecycle::new(config, runtime.clone(), document, store, on_progress, events_tx);

        let controller = PlayerController {
            lifecycle,
            runtime,
            receiver,
            runtime_events,
            progress_timer: None,
            readiness_timer: None,
        };
        let handle = PlayerHandle { sender };

        (handle, controller)
    }

    /// Run the controller event loop until every handle is dropped
    pub async fn run(mut self) {
        debug!("PlayerController event loop started");

        let runtime = self.runtime.clone();
        let mut availability: Option<BoxFuture<'static, ()>> =
            Some(Box::pin(async move { runtime.when_available().await }));

        loop {
            self.sync_progress_timer();
            self.sync_readiness_timer();
            let deadline = self.lifecycle.next_deadline();

            tokio::select! {
                command = self.receiver.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(envelope) = self.runtime_events.recv() => {
                    trace!("Runtime event: {:?}", envelope);
                    self.lifecycle.handle_runtime_event(envelope, Instant::now());
                }
                _ = wait_for(&mut availability) => {
                    availability = None;
                    debug!("Embedded runtime is available");
                    self.lifecycle.runtime_available();
                }
                _ = next_tick(self.progress_timer.as_mut().map(|(_, interval)| interval)) => {
                    if let Some(update) = self.lifecycle.poll_progress() {
                        trace!("Progress tick: {:?}", update);
                    }
                }
                _ = next_tick(self.readiness_timer.as_mut()) => {
                    if self.lifecycle.poll_readiness() {
                        debug!("Attachment point appeared, runtime constructed");
                    }
                }
                _ = sleep_until(deadline) => {
                    self.lifecycle.fire_due_timers(Instant::now());
                }
            }
        }

        self.lifecycle.unmount();
        debug!("PlayerController event loop terminated");
    }

    /// Keep the tick timer in step with the lifecycle's polling epoch. A new
    /// epoch gets a fresh timer whose first tick is one period out.
    fn sync_progress_timer(&mut self) {
        let wanted = self.lifecycle.polling_epoch();
        let current = self.progress_timer.as_ref().map(|(epoch, _)| *epoch);
        if wanted == current {
            return;
        }

        let period = self.lifecycle.progress_interval();
        self.progress_timer = wanted.map(|epoch| {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            (epoch, interval)
        });
    }

    /// Re-check initialization on a short period while construction waits on
    /// the attachment point. Any other phase drops the timer.
    fn sync_readiness_timer(&mut self) {
        if !self.lifecycle.awaiting_attachment() {
            if self.readiness_timer.take().is_some() {
                trace!("Readiness polling stopped");
            }
            return;
        }
        if self.readiness_timer.is_none() {
            let period = self.lifecycle.readiness_interval();
            trace!("Waiting for attachment point, polling every {:?}", period);
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            self.readiness_timer = Some(interval);
        }
    }

    fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::Mount { respond_to } => {
                trace!("Mounting");
                self.lifecycle.mount();
                let _ = respond_to.send(self.lifecycle.phase().clone());
            }
            PlayerCommand::Unmount { respond_to } => {
                trace!("Unmounting");
                self.lifecycle.unmount();
                let _ = respond_to.send(());
            }
            PlayerCommand::SetSource {
                reference,
                lesson_id,
                respond_to,
            } => {
                self.lifecycle.set_source(reference, lesson_id);
                let _ = respond_to.send(self.lifecycle.phase().clone());
            }
            PlayerCommand::PollReadiness { respond_to } => {
                let _ = respond_to.send(self.lifecycle.poll_readiness());
            }
            PlayerCommand::TogglePlay { respond_to } => {
                self.lifecycle.toggle_play();
                let _ = respond_to.send(());
            }
            PlayerCommand::Seek {
                position,
                respond_to,
            } => {
                trace!("Seeking to {}", position);
                self.lifecycle.seek(position);
                let _ = respond_to.send(());
            }
            PlayerCommand::SetVolume { volume, respond_to } => {
                self.lifecycle.set_volume(volume);
                let _ = respond_to.send(());
            }
            PlayerCommand::ToggleMute { respond_to } => {
                self.lifecycle.toggle_mute();
                let _ = respond_to.send(());
            }
            PlayerCommand::CycleSpeed { respond_to } => {
                let _ = respond_to.send(self.lifecycle.cycle_speed());
            }
            PlayerCommand::ToggleFullscreen { respond_to } => {
                let _ = respond_to.send(self.lifecycle.toggle_fullscreen());
            }
            PlayerCommand::Shield {
                gesture,
                respond_to,
            } => {
                let disposition = self.lifecycle.handle_shield(gesture, Instant::now());
                let _ = respond_to.send(disposition);
            }
            PlayerCommand::Key {
                key,
                focused,
                respond_to,
            } => {
                let _ = respond_to.send(self.lifecycle.handle_key(key, focused));
            }
            PlayerCommand::PointerMoved => self.lifecycle.pointer_moved(Instant::now()),
            PlayerCommand::PointerLeft => self.lifecycle.pointer_left(),
            PlayerCommand::GetView { respond_to } => {
                let _ = respond_to.send(self.lifecycle.view());
            }
        }
    }
}

async fn wait_for(future: &mut Option<BoxFuture<'static, ()>>) {
    match future {
        Some(future) => future.await,
        None => std::future::pending().await,
    }
}

async fn next_tick(timer: Option<&mut Interval>) {
    match timer {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Handle to send commands to the player controller
#[derive(Clone)]
pub struct PlayerHandle {
    sender: mpsc::UnboundedSender<PlayerCommand>,
}

impl std::fmt::Debug for PlayerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerHandle")
            .field("sender", &"<UnboundedSender>")
            .finish()
    }
}

impl PlayerHandle {
    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> PlayerCommand,
    ) -> Result<T, HandleError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(command(respond_to))
            .map_err(|_| HandleError::Disconnected)?;
        response.await.map_err(|_| HandleError::NoResponse)
    }

    fn notify(&self, command: PlayerCommand) -> Result<(), HandleError> {
        self.sender
            .send(command)
            .map_err(|_| HandleError::Disconnected)
    }

    pub async fn mount(&self) -> Result<PlayerPhase, HandleError> {
        self.request(|respond_to| PlayerCommand::Mount { respond_to })
            .await
    }

    pub async fn unmount(&self) -> Result<(), HandleError> {
        self.request(|respond_to| PlayerCommand::Unmount { respond_to })
            .await
    }

    /// Supply the video reference for a lesson
    pub async fn set_source(
        &self,
        reference: Option<&str>,
        lesson_id: impl Into<LessonId>,
    ) -> Result<PlayerPhase, HandleError> {
        let reference = reference.map(str::to_string);
        let lesson_id = lesson_id.into();
        self.request(|respond_to| PlayerCommand::SetSource {
            reference,
            lesson_id,
            respond_to,
        })
        .await
    }

    /// Re-check whether the runtime can be constructed now
    pub async fn poll_readiness(&self) -> Result<bool, HandleError> {
        self.request(|respond_to| PlayerCommand::PollReadiness { respond_to })
            .await
    }

    pub async fn toggle_play(&self) -> Result<(), HandleError> {
        self.request(|respond_to| PlayerCommand::TogglePlay { respond_to })
            .await
    }

    /// Seek to position in seconds
    pub async fn seek(&self, position: f64) -> Result<(), HandleError> {
        self.request(|respond_to| PlayerCommand::Seek {
            position,
            respond_to,
        })
        .await
    }

    pub async fn set_volume(&self, volume: u8) -> Result<(), HandleError> {
        self.request(|respond_to| PlayerCommand::SetVolume { volume, respond_to })
            .await
    }

    pub async fn toggle_mute(&self) -> Result<(), HandleError> {
        self.request(|respond_to| PlayerCommand::ToggleMute { respond_to })
            .await
    }

    pub async fn cycle_speed(&self) -> Result<Option<f64>, HandleError> {
        self.request(|respond_to| PlayerCommand::CycleSpeed { respond_to })
            .await
    }

    pub async fn toggle_fullscreen(&self) -> Result<bool, HandleError> {
        self.request(|respond_to| PlayerCommand::ToggleFullscreen { respond_to })
            .await
    }

    pub async fn shield(&self, gesture: ShieldGesture) -> Result<Disposition, HandleError> {
        self.request(|respond_to| PlayerCommand::Shield {
            gesture,
            respond_to,
        })
        .await
    }

    pub async fn key(&self, key: PlayerKey, focused: bool) -> Result<Disposition, HandleError> {
        self.request(|respond_to| PlayerCommand::Key {
            key,
            focused,
            respond_to,
        })
        .await
    }

    pub fn pointer_moved(&self) -> Result<(), HandleError> {
        self.notify(PlayerCommand::PointerMoved)
    }

    pub fn pointer_left(&self) -> Result<(), HandleError> {
        self.notify(PlayerCommand::PointerLeft)
    }

    pub async fn view(&self) -> Result<PlayerView, HandleError> {
        self.request(|respond_to| PlayerCommand::GetView { respond_to })
            .await
    }
}
