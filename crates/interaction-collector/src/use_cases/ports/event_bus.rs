use std::sync::Arc;

use crate::entities::{ChannelDelete, InteractionCreate, MessageDelete};
use crate::error::CollectorError;

/// Type alias for a typed bus callback
pub type EventHandler<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Trait for the gateway that pushes platform events.
///
/// Each event kind has its own subscription, bound to one typed callback.
/// A subscription stays live until its [`Subscription`] handle is cancelled
/// or dropped.
pub trait EventBus: Send + Sync {
    /// Subscribe to component interactions
    fn subscribe_interactions(
        &self,
        handler: EventHandler<InteractionCreate>,
    ) -> Result<Subscription, CollectorError>;

    /// Subscribe to message deletions
    fn subscribe_message_deletes(
        &self,
        handler: EventHandler<MessageDelete>,
    ) -> Result<Subscription, CollectorError>;

    /// Subscribe to channel deletions
    fn subscribe_channel_deletes(
        &self,
        handler: EventHandler<ChannelDelete>,
    ) -> Result<Subscription, CollectorError>;
}

/// Owned handle to a bus subscription; unsubscribes when cancelled or dropped
pub struct Subscription {
    id: u64,
    release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Create a handle that runs `release` exactly once when the subscription ends
    pub fn new(id: u64, release: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            id,
            release: Some(Box::new(release)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Unsubscribe now
    pub fn cancel(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("live", &self.release.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_subscription_releases_once_on_cancel() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = released.clone();
        let subscription = Subscription::new(1, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(subscription.id(), 1);
        subscription.cancel();
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscription_releases_on_drop() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = released.clone();
        {
            let _subscription = Subscription::new(2, move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }
}
