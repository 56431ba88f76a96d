
use lesson_player::Config;
use lesson_player::player::{PlayerLifecycle, RuntimeEnvelope};
use lesson_player::services::MemoryProgressStore;
use mocks::{CallLog, MockDocument, MockRuntime, ProgressRecorder};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Instant;

pub const VIDEO: &str = "dQw4w9WgXcQ";
pub const OTHER_VIDEO: &str = "9bZkp7q19f0";

/// A lifecycle core wired to mocks, with its runtime event channel exposed
/// so tests can pump events by hand.
pub struct TestContext {
    pub lifecycle: PlayerLifecycle,
    pub runtime: Arc<MockRuntime>,
    pub document: Arc<MockDocument>,
    pub store: Arc<MemoryProgressStore>,
    pub progress: ProgressRecorder,
    pub log: CallLog,
    events: mpsc::UnboundedReceiver<RuntimeEnvelope>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_parts(Config::default(), MockDocument::new, MockRuntime::new)
    }

    pub fn with_parts(
        config: Config,
        document: impl FnOnce(CallLog) -> MockDocument,
        runtime: impl FnOnce(CallLog) -> MockRuntime,
    ) -> Self {
        let log = CallLog::default();
        let runtime = Arc::new(runtime(log.clone()));
        let document = Arc::new(document(log.clone()));
        let store = Arc::new(MemoryProgressStore::new());
        let progress = ProgressRecorder::default();
        let (events_tx, events) = mpsc::unbounded_channel();

        let lifecycle = PlayerLifecycle::new(
            &config,
            runtime.clone(),
            document.clone(),
            store.clone(),
            progress.callback(),
            events_tx,
        );

        Self {
            lifecycle,
            runtime,
            document,
            store,
            progress,
            log,
            events,
        }
    }

    /// Mounts with the runtime already available and loads `reference`.
    pub fn mounted_with(reference: &str) -> Self {
        let mut ctx = Self::new();
        ctx.lifecycle.runtime_available();
        ctx.lifecycle.mount();
        ctx.lifecycle.set_source(Some(reference.to_string()), "42".into());
        ctx
    }

    /// Deliver every queued runtime event to the lifecycle.
    pub fn pump(&mut self) {
        while let Ok(envelope) = self.events.try_recv() {
            self.lifecycle.handle_runtime_event(envelope, Instant::now());
        }
    }

    /// Fire `ready` on the latest instance and deliver it.
    pub fn ready(&mut self) {
        if let Some(sink) = self.runtime.last_sink() {
            sink.ready();
        }
        self.pump();
    }
}
