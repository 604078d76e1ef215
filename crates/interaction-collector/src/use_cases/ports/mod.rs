mod event_bus;
mod finalizer;
mod listener;
mod policy;

pub use event_bus::{EventBus, EventHandler, Subscription};
pub use finalizer::{ControlFinalizer, KeepControls};
pub use listener::{CollectorListener, HookResult};
pub use policy::{CollectPolicy, EventSink};
pub(crate) use policy::SinkTarget;
