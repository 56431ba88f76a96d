use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc;

use super::types::RuntimeState;
use crate::models::VideoId;

/// Lifecycle callbacks emitted by an embedded runtime instance.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeEvent {
    Ready,
    StateChanged(RuntimeState),
    Error(i32),
}

/// A runtime event tagged with the generation of the instance that sent it.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeEnvelope {
    pub generation: u64,
    pub event: RuntimeEvent,
}

/// Callback target handed to the runtime at construction time.
///
/// Events sent after the instance was torn down carry a stale generation and
/// are dropped by the lifecycle core.
#[derive(Debug, Clone)]
pub struct RuntimeEventSink {
    generation: u64,
    sender: mpsc::UnboundedSender<RuntimeEnvelope>,
}

impl RuntimeEventSink {
    pub(crate) fn new(generation: u64, sender: mpsc::UnboundedSender<RuntimeEnvelope>) -> Self {
        Self { generation, sender }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn ready(&self) {
        self.emit(RuntimeEvent::Ready);
    }

    pub fn state_changed(&self, state: RuntimeState) {
        self.emit(RuntimeEvent::StateChanged(state));
    }

    pub fn error(&self, code: i32) {
        self.emit(RuntimeEvent::Error(code));
    }

    fn emit(&self, event: RuntimeEvent) {
        let _ = self.sender.send(RuntimeEnvelope {
            generation: self.generation,
            event,
        });
    }
}

/// Construction options. The host renders its own controls, so every native
/// affordance of the runtime is switched off.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeOptions {
    pub video_id: VideoId,
    pub embed_host: String,
    pub origin: Option<String>,
    pub native_controls: bool,
    pub keyboard: bool,
    pub fullscreen_button: bool,
    pub related_content: bool,
}

impl RuntimeOptions {
    pub fn locked_down(video_id: VideoId, embed_host: &str, origin: Option<String>) -> Self {
        Self {
            video_id,
            embed_host: embed_host.to_string(),
            origin,
            native_controls: false,
            keyboard: false,
            fullscreen_button: false,
            related_content: false,
        }
    }

    /// The IFrame API `playerVars` object for these options.
    pub fn player_vars(&self) -> PlayerVars {
        PlayerVars {
            controls: self.native_controls.into(),
            disablekb: (!self.keyboard).into(),
            fs: self.fullscreen_button.into(),
            rel: self.related_content.into(),
            modestbranding: 1,
            cc_load_policy: 0,
            iv_load_policy: 3,
            playsinline: 1,
            origin: self.origin.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerVars {
    pub controls: u8,
    pub disablekb: u8,
    pub fs: u8,
    pub rel: u8,
    pub modestbranding: u8,
    pub cc_load_policy: u8,
    pub iv_load_policy: u8,
    pub playsinline: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

/// Factory side of the embeddable video runtime.
#[async_trait]
pub trait PlayerRuntime: Send + Sync {
    /// Resolves once instances can be constructed (script loaded, globals
    /// installed).
    async fn when_available(&self);

    fn construct(
        &self,
        attachment_id: &str,
        options: RuntimeOptions,
        events: RuntimeEventSink,
    ) -> Result<Box<dyn RuntimeInstance>>;
}

/// Full capability set required from a live runtime instance.
pub trait RuntimeInstance: Send {
    fn play(&mut self);
    fn pause(&mut self);
    fn seek_to(&mut self, seconds: f64);
    /// Volume in the 0-100 range.
    fn set_volume(&mut self, volume: u8);
    fn volume(&self) -> u8;
    fn mute(&mut self);
    fn un_mute(&mut self);
    fn is_muted(&self) -> bool;
    fn current_time(&self) -> Option<f64>;
    fn duration(&self) -> Option<f64>;
    fn set_playback_rate(&mut self, rate: f64);
    /// Whether the instance has attached its output element yet.
    fn has_output(&self) -> bool;
    fn destroy(&mut self);
}

/// The page hosting the player: location, attachment and fullscreen.
pub trait HostDocument: Send + Sync {
    fn hostname(&self) -> Option<String>;
    fn origin(&self) -> Option<String>;
    fn attachment_present(&self, attachment_id: &str) -> bool;
    fn fullscreen_active(&self) -> bool;
    /// Requests fullscreen on the outer player container.
    fn request_fullscreen(&self) -> Result<()>;
    fn exit_fullscreen(&self) -> Result<()>;
}
