use std::collections::HashSet;
use std::sync::Arc;

use crate::entities::{
    Actor, ChannelDelete, CollectorEndReason, CollectorFilter, ComponentInteraction, IdentityKey,
    InteractionCreate, InteractionOptions, MessageDelete, MessageRef, Snowflake,
};
use crate::error::CollectorError;
use crate::use_cases::collector::{Collector, CollectorBuilder};
use crate::use_cases::ports::{CollectPolicy, EventBus, EventSink, Subscription};

/// A collector of component interactions bound to a message or channel
pub type InteractionCollector = Collector<ComponentInteraction, InteractionScope>;

/// What an interaction collector is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Interactions on one message; ends when the message or its channel is deleted
    Message(MessageRef),
    /// Interactions on any message in a channel; ends when the channel is deleted
    Channel(Snowflake),
}

impl Scope {
    pub fn channel_id(&self) -> Snowflake {
        match self {
            Scope::Message(message) => message.channel_id,
            Scope::Channel(channel_id) => *channel_id,
        }
    }

    pub fn message(&self) -> Option<MessageRef> {
        match self {
            Scope::Message(message) => Some(*message),
            Scope::Channel(_) => None,
        }
    }

    fn contains(&self, interaction: &ComponentInteraction) -> bool {
        match self {
            Scope::Message(message) => interaction.message_id == message.id,
            Scope::Channel(channel_id) => interaction.channel_id == *channel_id,
        }
    }
}

/// Running counters of an interaction collector
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeTally {
    /// Interactions accepted so far
    pub total: usize,
    /// Distinct users seen so far
    pub users: HashSet<Snowflake>,
}

/// Scope guard, scope-destruction handling and ceilings for interaction collectors
#[derive(Debug, Clone)]
pub struct InteractionScope {
    scope: Scope,
    max: Option<usize>,
    max_components: Option<usize>,
    max_users: Option<usize>,
}

impl InteractionScope {
    pub fn new(scope: Scope, options: &InteractionOptions) -> Self {
        Self {
            scope,
            max: options.max,
            max_components: options.max_components,
            max_users: options.max_users,
        }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }
}

impl CollectPolicy<ComponentInteraction> for InteractionScope {
    type Tally = ScopeTally;

    fn validate(&self) -> Result<(), CollectorError> {
        InteractionOptions {
            max: self.max,
            max_components: self.max_components,
            max_users: self.max_users,
            ..InteractionOptions::default()
        }
        .validate()
    }

    fn subscribe(
        &self,
        bus: &dyn EventBus,
        sink: EventSink<ComponentInteraction>,
    ) -> Result<Vec<Subscription>, CollectorError> {
        let mut subscriptions = Vec::with_capacity(3);

        let scope = self.scope;
        let collect = sink.clone();
        subscriptions.push(bus.subscribe_interactions(Arc::new(move |event: &InteractionCreate| {
            if scope.contains(&event.interaction) {
                collect.collect(event.interaction.clone(), event.actor.clone());
            }
        }))?);

        if let Scope::Message(message) = self.scope {
            let stop = sink.clone();
            subscriptions.push(bus.subscribe_message_deletes(Arc::new(move |event: &MessageDelete| {
                if event.message_id == message.id {
                    stop.stop(CollectorEndReason::MessageDelete);
                }
            }))?);
        }

        let channel_id = self.scope.channel_id();
        subscriptions.push(bus.subscribe_channel_deletes(Arc::new(move |event: &ChannelDelete| {
            if event.channel_id == channel_id {
                sink.stop(CollectorEndReason::ChannelDelete);
            }
        }))?);

        Ok(subscriptions)
    }

    fn key(&self, item: &ComponentInteraction) -> Option<IdentityKey> {
        self.scope
            .contains(item)
            .then_some(IdentityKey::Id(item.id))
    }

    fn record(&self, tally: &mut ScopeTally, _item: &ComponentInteraction, actor: Option<&Actor>) {
        tally.total += 1;
        if let Some(actor) = actor {
            tally.users.insert(actor.id);
        }
    }

    fn end_reason(&self, tally: &ScopeTally, collected: usize) -> Option<CollectorEndReason> {
        if self.max.is_some_and(|max| tally.total >= max) {
            Some(CollectorEndReason::Limit)
        } else if self.max_components.is_some_and(|max| collected >= max) {
            Some(CollectorEndReason::ComponentLimit)
        } else if self.max_users.is_some_and(|max| tally.users.len() >= max) {
            Some(CollectorEndReason::UserLimit)
        } else {
            None
        }
    }
}

impl Collector<ComponentInteraction, InteractionScope> {
    /// Builder for a collector bound to `scope`
    pub fn builder(
        scope: Scope,
        options: InteractionOptions,
    ) -> CollectorBuilder<ComponentInteraction, InteractionScope> {
        CollectorBuilder::new(InteractionScope::new(scope, &options)).options(options.collector)
    }

    /// Collect interactions on one message
    pub fn for_message(
        bus: &dyn EventBus,
        message: MessageRef,
        filter: CollectorFilter<ComponentInteraction>,
        options: InteractionOptions,
    ) -> Result<Self, CollectorError> {
        Self::builder(Scope::Message(message), options)
            .filter(filter)
            .subscribe(bus)
    }

    /// Collect interactions on any message in a channel
    pub fn for_channel(
        bus: &dyn EventBus,
        channel_id: Snowflake,
        filter: CollectorFilter<ComponentInteraction>,
        options: InteractionOptions,
    ) -> Result<Self, CollectorError> {
        Self::builder(Scope::Channel(channel_id), options)
            .filter(filter)
            .subscribe(bus)
    }

    pub fn scope(&self) -> Scope {
        self.policy().scope()
    }

    /// Interactions accepted so far
    pub fn total(&self) -> usize {
        self.with_tally(|tally| tally.total)
    }

    /// Distinct users seen so far
    pub fn user_count(&self) -> usize {
        self.with_tally(|tally| tally.users.len())
    }
}
