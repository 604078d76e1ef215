use std::sync::Arc;

use tracing::{debug, warn};

use crate::entities::{
    Collected, CollectorEndReason, CollectorFilter, ComponentInteraction, InteractionOptions,
    MessageRef,
};
use crate::error::{CollectorEnded, CollectorError};
use crate::use_cases::interaction_collector::{InteractionCollector, Scope};
use crate::use_cases::ports::{CollectorListener, ControlFinalizer, EventBus};

/// Builder for awaiting interactions on a message as a single future
///
/// # Example
///
/// ```rust,no_run
/// use interaction_collector::prelude::*;
/// use std::time::Duration;
///
/// # async fn run(bus: LocalBus, message: MessageRef) -> Result<(), CollectorError> {
/// let votes = AwaitInteractions::new(message)
///     .filter(CollectorFilter::all().one_per_actor())
///     .options(InteractionOptions::new().with_time(Duration::from_secs(60)).with_max_users(5))
///     .success_reasons([CollectorEndReason::Time, CollectorEndReason::UserLimit])
///     .wait(&bus)
///     .await?;
/// println!("{} votes", votes.len());
/// # Ok(())
/// # }
/// ```
pub struct AwaitInteractions {
    message: MessageRef,
    filter: CollectorFilter<ComponentInteraction>,
    options: InteractionOptions,
    success_reasons: Vec<CollectorEndReason>,
    listener: Option<Arc<dyn CollectorListener<ComponentInteraction>>>,
    finalizer: Option<Arc<dyn ControlFinalizer>>,
}

impl AwaitInteractions {
    /// Await interactions on `message`; every end reason counts as success until narrowed
    pub fn new(message: MessageRef) -> Self {
        Self {
            message,
            filter: CollectorFilter::all(),
            options: InteractionOptions::default(),
            success_reasons: CollectorEndReason::ALL.to_vec(),
            listener: None,
            finalizer: None,
        }
    }

    pub fn filter(mut self, filter: CollectorFilter<ComponentInteraction>) -> Self {
        self.filter = filter;
        self
    }

    pub fn options(mut self, options: InteractionOptions) -> Self {
        self.options = options;
        self
    }

    /// End reasons that resolve with the snapshot; any other reason is an error
    pub fn success_reasons(mut self, reasons: impl IntoIterator<Item = CollectorEndReason>) -> Self {
        self.success_reasons = reasons.into_iter().collect();
        self
    }

    /// Listener whose hooks fire alongside the adapter; an `on_end` error fails the future
    pub fn listener(mut self, listener: Arc<dyn CollectorListener<ComponentInteraction>>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Replace the bus's own control finalizer
    pub fn finalizer(mut self, finalizer: Arc<dyn ControlFinalizer>) -> Self {
        self.finalizer = Some(finalizer);
        self
    }

    /// Collect until the collector ends, finalize the message's controls, then settle
    ///
    /// Dropping the future before it settles ends the collector with
    /// [`CollectorEndReason::User`] and skips the finalizer.
    pub async fn wait<B>(self, bus: &B) -> Result<Collected<ComponentInteraction>, CollectorError>
    where
        B: EventBus + ControlFinalizer,
    {
        let mut builder = InteractionCollector::builder(Scope::Message(self.message), self.options)
            .filter(self.filter);
        if let Some(listener) = self.listener {
            builder = builder.listener(listener);
        }
        let collector = builder.subscribe(bus)?;
        let settled = collector.ended().await;

        let selected: Vec<String> = settled
            .collected
            .values()
            .map(|interaction| interaction.component_id.clone())
            .collect();
        let finalizer: &dyn ControlFinalizer = match &self.finalizer {
            Some(finalizer) => finalizer.as_ref(),
            None => bus,
        };
        if let Err(e) = finalizer.disable_controls(&self.message, &selected).await {
            warn!(message_id = self.message.id, error = %e, "failed to finalize controls");
        }
        debug!(
            message_id = self.message.id,
            reason = %settled.reason,
            collected = settled.collected.len(),
            "await settled"
        );

        settled.hook.clone()?;
        Ok(settled.outcome(&self.success_reasons)?)
    }

    /// Like [`wait`](Self::wait) with `max = 1`, resolving with the single interaction
    pub async fn wait_one<B>(mut self, bus: &B) -> Result<ComponentInteraction, CollectorError>
    where
        B: EventBus + ControlFinalizer,
    {
        self.options.max = Some(1);
        self.success_reasons = vec![CollectorEndReason::Limit];
        let collected = self.wait(bus).await?;
        match collected.first() {
            Some(interaction) => Ok(interaction.clone()),
            None => Err(CollectorEnded {
                reason: CollectorEndReason::Limit,
                collected,
            }
            .into()),
        }
    }
}

/// Wait for exactly one interaction on `message`.
///
/// Any end other than the first accepted interaction is an error carrying the end reason.
pub async fn await_one<B>(
    bus: &B,
    message: MessageRef,
    filter: CollectorFilter<ComponentInteraction>,
    options: InteractionOptions,
) -> Result<ComponentInteraction, CollectorError>
where
    B: EventBus + ControlFinalizer,
{
    AwaitInteractions::new(message)
        .filter(filter)
        .options(options)
        .wait_one(bus)
        .await
}

/// Wait for interactions on `message` until the collector ends.
///
/// Resolves with everything collected when the end reason is one of
/// `success_reasons`, otherwise fails with the reason and the partial snapshot.
pub async fn await_many<B>(
    bus: &B,
    message: MessageRef,
    filter: CollectorFilter<ComponentInteraction>,
    options: InteractionOptions,
    success_reasons: &[CollectorEndReason],
) -> Result<Collected<ComponentInteraction>, CollectorError>
where
    B: EventBus + ControlFinalizer,
{
    AwaitInteractions::new(message)
        .filter(filter)
        .options(options)
        .success_reasons(success_reasons.iter().copied())
        .wait(bus)
        .await
}
