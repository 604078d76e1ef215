mod await_interactions;
mod collector;
mod interaction_collector;
pub mod ports;

pub use await_interactions::{await_many, await_one, AwaitInteractions};
pub use collector::{Collector, CollectorBuilder};
pub use interaction_collector::{InteractionCollector, InteractionScope, Scope, ScopeTally};
