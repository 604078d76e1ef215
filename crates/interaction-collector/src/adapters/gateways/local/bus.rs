use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, Mutex, MutexGuard, PoisonError, Weak,
};
use tracing::debug;

use crate::entities::{
    Actor, ChannelDelete, ComponentInteraction, GatewayEvent, InteractionCreate, MessageDelete,
    MessageRef, Snowflake,
};
use crate::error::CollectorError;
use crate::use_cases::ports::{ControlFinalizer, EventBus, EventHandler, Subscription};

/// In-process event bus.
///
/// Events are delivered synchronously on the publishing thread, in
/// subscription order. Whoever owns the gateway connection feeds events in
/// with [`publish`](LocalBus::publish); finalized controls are recorded so
/// the owner can apply them to the real message.
#[derive(Clone, Default)]
pub struct LocalBus {
    inner: Arc<Inner>,
}

/// Controls finalized on a message after a collector ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedControls {
    pub message: MessageRef,
    pub selected: Vec<String>,
}

#[derive(Default)]
struct Inner {
    next_id: AtomicU64,
    closed: AtomicBool,
    interactions: Registry<InteractionCreate>,
    message_deletes: Registry<MessageDelete>,
    channel_deletes: Registry<ChannelDelete>,
    finalized: Mutex<Vec<FinalizedControls>>,
}

/// Handlers for one event kind
struct Registry<E> {
    handlers: Mutex<BTreeMap<u64, EventHandler<E>>>,
}

impl<E> Default for Registry<E> {
    fn default() -> Self {
        Self {
            handlers: Mutex::new(BTreeMap::new()),
        }
    }
}

impl<E> Registry<E> {
    fn lock(&self) -> MutexGuard<'_, BTreeMap<u64, EventHandler<E>>> {
        self.handlers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn len(&self) -> usize {
        self.lock().len()
    }

    /// Call every handler without holding the lock, so handlers may unsubscribe
    fn dispatch(&self, event: &E) {
        let handlers: Vec<EventHandler<E>> = self.lock().values().cloned().collect();
        for handler in handlers {
            handler(event);
        }
    }
}

impl LocalBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver an event to every current subscriber of its kind
    pub fn publish(&self, event: impl Into<GatewayEvent>) {
        match event.into() {
            GatewayEvent::Interaction(event) => self.inner.interactions.dispatch(&event),
            GatewayEvent::MessageDelete(event) => self.inner.message_deletes.dispatch(&event),
            GatewayEvent::ChannelDelete(event) => self.inner.channel_deletes.dispatch(&event),
        }
    }

    pub fn publish_interaction(&self, interaction: ComponentInteraction, actor: Option<Actor>) {
        self.publish(InteractionCreate { interaction, actor });
    }

    pub fn delete_message(&self, message: MessageRef) {
        self.publish(MessageDelete {
            message_id: message.id,
            channel_id: message.channel_id,
        });
    }

    pub fn delete_channel(&self, channel_id: Snowflake) {
        self.publish(ChannelDelete { channel_id });
    }

    /// Refuse new subscriptions; existing ones keep receiving events
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Number of live subscriptions across every event kind
    pub fn subscriber_count(&self) -> usize {
        self.inner.interactions.len()
            + self.inner.message_deletes.len()
            + self.inner.channel_deletes.len()
    }

    /// Controls finalized so far, oldest first
    pub fn finalized(&self) -> Vec<FinalizedControls> {
        self.inner
            .finalized
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn subscribe<E: 'static>(
        &self,
        registry: fn(&Inner) -> &Registry<E>,
        handler: EventHandler<E>,
    ) -> Result<Subscription, CollectorError> {
        if self.is_closed() {
            return Err(CollectorError::BusError("bus is closed".to_string()));
        }
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        registry(&self.inner).lock().insert(id, handler);
        debug!(subscription = id, "subscribed");

        let inner: Weak<Inner> = Arc::downgrade(&self.inner);
        Ok(Subscription::new(id, move || {
            if let Some(inner) = inner.upgrade() {
                registry(&inner).lock().remove(&id);
                debug!(subscription = id, "unsubscribed");
            }
        }))
    }
}

impl EventBus for LocalBus {
    fn subscribe_interactions(
        &self,
        handler: EventHandler<InteractionCreate>,
    ) -> Result<Subscription, CollectorError> {
        self.subscribe(|inner| &inner.interactions, handler)
    }

    fn subscribe_message_deletes(
        &self,
        handler: EventHandler<MessageDelete>,
    ) -> Result<Subscription, CollectorError> {
        self.subscribe(|inner| &inner.message_deletes, handler)
    }

    fn subscribe_channel_deletes(
        &self,
        handler: EventHandler<ChannelDelete>,
    ) -> Result<Subscription, CollectorError> {
        self.subscribe(|inner| &inner.channel_deletes, handler)
    }
}

#[async_trait]
impl ControlFinalizer for LocalBus {
    async fn disable_controls(
        &self,
        message: &MessageRef,
        selected: &[String],
    ) -> Result<(), CollectorError> {
        self.inner
            .finalized
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(FinalizedControls {
                message: *message,
                selected: selected.to_vec(),
            });
        Ok(())
    }
}
