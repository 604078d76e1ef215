use super::{Actor, ComponentInteraction, Snowflake};

/// An interaction delivered by the gateway, with the user who produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionCreate {
    pub interaction: ComponentInteraction,
    pub actor: Option<Actor>,
}

/// A message was deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageDelete {
    pub message_id: Snowflake,
    pub channel_id: Snowflake,
}

/// A channel was deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelDelete {
    pub channel_id: Snowflake,
}

/// The gateway events a collector cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEvent {
    Interaction(InteractionCreate),
    MessageDelete(MessageDelete),
    ChannelDelete(ChannelDelete),
}

impl From<InteractionCreate> for GatewayEvent {
    fn from(event: InteractionCreate) -> Self {
        GatewayEvent::Interaction(event)
    }
}

impl From<MessageDelete> for GatewayEvent {
    fn from(event: MessageDelete) -> Self {
        GatewayEvent::MessageDelete(event)
    }
}

impl From<ChannelDelete> for GatewayEvent {
    fn from(event: ChannelDelete) -> Self {
        GatewayEvent::ChannelDelete(event)
    }
}
