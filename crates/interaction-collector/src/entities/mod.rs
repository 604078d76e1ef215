mod collected;
mod end_reason;
mod event;
mod filter;
mod identity;
mod interaction;
mod options;

pub use collected::{Collected, Settled};
pub use end_reason::CollectorEndReason;
pub use event::{ChannelDelete, GatewayEvent, InteractionCreate, MessageDelete};
pub use filter::{CollectorFilter, FilterFn, KeyFn};
pub use identity::IdentityKey;
pub use interaction::{Actor, ComponentInteraction, MessageRef, Snowflake};
pub use options::{CollectorOptions, InteractionOptions};
