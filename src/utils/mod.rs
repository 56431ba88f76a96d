pub mod errors;

pub use errors::{HandleError, PlayerError, RuntimeErrorCode, StoreError};
