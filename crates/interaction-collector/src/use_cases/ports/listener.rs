use crate::entities::{Actor, Collected, CollectorEndReason};
use crate::error::HookError;

/// Result type returned by listener hooks
pub type HookResult = Result<(), HookError>;

/// Hooks fired by a collector.
///
/// Per-event hooks run on the delivery context and must not block. An error
/// from a per-event hook is logged and collection continues; an error from
/// [`on_end`](CollectorListener::on_end) is handed to whoever awaits the
/// collector.
pub trait CollectorListener<T>: Send + Sync {
    /// An event was accepted into the collected map
    fn on_collect(&self, _item: &T, _actor: Option<&Actor>) -> HookResult {
        Ok(())
    }

    /// An entry was removed from the collected map
    fn on_remove(&self, _item: &T, _actor: Option<&Actor>) -> HookResult {
        Ok(())
    }

    /// A retraction event passed the filter
    fn on_dispose(&self, _item: &T, _actor: Option<&Actor>) -> HookResult {
        Ok(())
    }

    /// Fired exactly once, with the frozen snapshot
    fn on_end(&self, _collected: &Collected<T>, _reason: CollectorEndReason) -> HookResult {
        Ok(())
    }
}
