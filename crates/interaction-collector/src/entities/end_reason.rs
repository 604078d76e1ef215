use serde::{Deserialize, Serialize};

/// Why a collector stopped accepting events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollectorEndReason {
    /// The total time budget ran out
    Time,
    /// No event was accepted within the idle budget
    Idle,
    /// Stopped explicitly by calling code
    #[serde(rename = "USER_CANCEL")]
    User,
    /// The accepted-event ceiling was reached
    Limit,
    /// The distinct-identity ceiling was reached
    ComponentLimit,
    /// The distinct-actor ceiling was reached
    UserLimit,
    /// The bound message was deleted
    MessageDelete,
    /// The bound channel was deleted
    ChannelDelete,
}

impl CollectorEndReason {
    /// Every end reason, in declaration order
    pub const ALL: [CollectorEndReason; 8] = [
        CollectorEndReason::Time,
        CollectorEndReason::Idle,
        CollectorEndReason::User,
        CollectorEndReason::Limit,
        CollectorEndReason::ComponentLimit,
        CollectorEndReason::UserLimit,
        CollectorEndReason::MessageDelete,
        CollectorEndReason::ChannelDelete,
    ];

    /// Reasons produced by a timer rather than by an event
    pub fn is_timeout(self) -> bool {
        matches!(self, CollectorEndReason::Time | CollectorEndReason::Idle)
    }

    /// Reasons produced because the bound scope no longer exists
    pub fn is_scope_destroyed(self) -> bool {
        matches!(
            self,
            CollectorEndReason::MessageDelete | CollectorEndReason::ChannelDelete
        )
    }
}

impl std::fmt::Display for CollectorEndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectorEndReason::Time => write!(f, "TIME"),
            CollectorEndReason::Idle => write!(f, "IDLE"),
            CollectorEndReason::User => write!(f, "USER_CANCEL"),
            CollectorEndReason::Limit => write!(f, "LIMIT"),
            CollectorEndReason::ComponentLimit => write!(f, "COMPONENT_LIMIT"),
            CollectorEndReason::UserLimit => write!(f, "USER_LIMIT"),
            CollectorEndReason::MessageDelete => write!(f, "MESSAGE_DELETE"),
            CollectorEndReason::ChannelDelete => write!(f, "CHANNEL_DELETE"),
        }
    }
}
