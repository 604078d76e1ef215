#[cfg(feature = "local-bus")]
mod local;

#[cfg(feature = "local-bus")]
pub use local::{FinalizedControls, LocalBus};
