pub mod controller;
mod init_lock;
pub mod lifecycle;
pub mod traits;
pub mod types;

pub use controller::{PlayerCommand, PlayerController, PlayerHandle};
pub use init_lock::InitLock;
pub use lifecycle::PlayerLifecycle;
pub use traits::{
    HostDocument, PlayerRuntime, PlayerVars, RuntimeEnvelope, RuntimeEvent, RuntimeEventSink,
    RuntimeInstance, RuntimeOptions,
};
pub use types::{Disposition, PlaybackState, PlayerPhase, RuntimeState, SpeedCycle};
