mod bus;

pub use bus::{FinalizedControls, LocalBus};
