use std::sync::Weak;

use super::{EventBus, Subscription};
use crate::entities::{Actor, CollectorEndReason, IdentityKey};
use crate::error::CollectorError;

/// What a specialized collector adds on top of the generic engine.
///
/// The policy decides which bus events reach the engine, which events are in
/// scope, how they are keyed, and when the collected state is complete.
/// `Tally` holds the policy's running counters; it lives inside the engine's
/// state and is reset with it.
pub trait CollectPolicy<T>: Send + Sync + 'static {
    type Tally: Default + Send;

    /// Reject contradictory policy settings before anything is subscribed
    fn validate(&self) -> Result<(), CollectorError> {
        Ok(())
    }

    /// Subscribe to the bus, routing events into `sink`.
    ///
    /// On error, subscriptions already made are dropped by the caller.
    fn subscribe(
        &self,
        bus: &dyn EventBus,
        sink: EventSink<T>,
    ) -> Result<Vec<Subscription>, CollectorError>;

    /// Default identity key for an in-scope event, `None` when out of scope
    fn key(&self, item: &T) -> Option<IdentityKey>;

    /// Record an accepted event in the running counters
    fn record(&self, _tally: &mut Self::Tally, _item: &T, _actor: Option<&Actor>) {}

    /// Evaluated after every accepted or removed event
    fn end_reason(&self, _tally: &Self::Tally, _collected: usize) -> Option<CollectorEndReason> {
        None
    }
}

/// Engine-side receiver of routed events
pub(crate) trait SinkTarget<T>: Send + Sync {
    fn collect(&self, item: T, actor: Option<Actor>);
    fn dispose(&self, item: T, actor: Option<Actor>);
    fn stop(&self, reason: CollectorEndReason) -> bool;
}

/// Weak handle through which bus callbacks feed a collector.
///
/// Holding a sink does not keep the collector alive; once it is gone every
/// call is a no-op.
pub struct EventSink<T> {
    target: Weak<dyn SinkTarget<T>>,
}

impl<T> EventSink<T> {
    pub(crate) fn new(target: Weak<dyn SinkTarget<T>>) -> Self {
        Self { target }
    }

    /// Offer an event for collection
    pub fn collect(&self, item: T, actor: Option<Actor>) {
        if let Some(target) = self.target.upgrade() {
            target.collect(item, actor);
        }
    }

    /// Offer a retraction event
    pub fn dispose(&self, item: T, actor: Option<Actor>) {
        if let Some(target) = self.target.upgrade() {
            target.dispose(item, actor);
        }
    }

    /// End the collector; returns whether this call ended it
    pub fn stop(&self, reason: CollectorEndReason) -> bool {
        self.target
            .upgrade()
            .map(|target| target.stop(reason))
            .unwrap_or(false)
    }
}

impl<T> Clone for EventSink<T> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
        }
    }
}
