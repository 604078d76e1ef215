use serde::{Deserialize, Serialize};

/// Platform-wide numeric identifier
pub type Snowflake = u64;

/// The user who produced an interaction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    pub id: Snowflake,
    pub name: String,
}

impl Actor {
    pub fn new(id: Snowflake, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A message posted by the bot, carrying interactive controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    pub id: Snowflake,
    pub channel_id: Snowflake,
}

impl MessageRef {
    pub fn new(id: Snowflake, channel_id: Snowflake) -> Self {
        Self { id, channel_id }
    }
}

/// A single button press or select-menu choice on a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentInteraction {
    pub id: Snowflake,
    pub message_id: Snowflake,
    pub channel_id: Snowflake,
    pub component_id: String,
    #[serde(default)]
    pub values: Vec<String>,
}

impl ComponentInteraction {
    pub fn new(id: Snowflake, message: MessageRef, component_id: impl Into<String>) -> Self {
        Self {
            id,
            message_id: message.id,
            channel_id: message.channel_id,
            component_id: component_id.into(),
            values: Vec::new(),
        }
    }

    /// Attach select-menu values
    pub fn with_values(mut self, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }

    /// The message this interaction was produced on
    pub fn message(&self) -> MessageRef {
        MessageRef::new(self.message_id, self.channel_id)
    }
}
