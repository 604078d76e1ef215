//! Interaction Collector
//!
//! Lets a chat-bot command wait for the button presses that users push at a
//! message, filter and aggregate them, and get back one outcome as if the
//! wait were a plain function call. Every collector ends exactly once: on a
//! timer, on an explicit stop, on a ceiling, or when its message or channel
//! is deleted.
//!
//! # Example
//!
//! ```rust,no_run
//! use interaction_collector::prelude::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), CollectorError> {
//!     // The gateway connection feeds events into the bus
//!     let bus = LocalBus::new();
//!     let message = MessageRef::new(1001, 2002);
//!     let author: Snowflake = 42;
//!
//!     // Wait for the command author to press one of the buttons
//!     let pressed = await_one(
//!         &bus,
//!         message,
//!         CollectorFilter::from_actor(author),
//!         InteractionOptions::new().with_time(Duration::from_secs(30)),
//!     )
//!     .await;
//!
//!     match pressed {
//!         Ok(interaction) => println!("Pressed: {}", interaction.component_id),
//!         Err(e) if e.end_reason().is_some_and(CollectorEndReason::is_timeout) => {
//!             println!("Ran out of time");
//!         }
//!         Err(e) => return Err(e),
//!     }
//!
//!     // Buttons on the message have been finalized before the await returned
//!     assert_eq!(bus.finalized().len(), 1);
//!     Ok(())
//! }
//! ```

mod adapters;
pub mod entities;
pub mod error;
pub mod use_cases;

pub use error::{CollectorEnded, CollectorError, HookError};

#[cfg(feature = "local-bus")]
pub use adapters::gateways::{FinalizedControls, LocalBus};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::entities::{
        Actor, Collected, CollectorEndReason, CollectorFilter, CollectorOptions,
        ComponentInteraction, GatewayEvent, IdentityKey, InteractionOptions, MessageRef, Settled,
        Snowflake,
    };
    pub use crate::error::{CollectorEnded, CollectorError, HookError};
    pub use crate::use_cases::ports::{
        CollectPolicy, CollectorListener, ControlFinalizer, EventBus, HookResult, KeepControls,
        Subscription,
    };
    pub use crate::use_cases::{
        await_many, await_one, AwaitInteractions, Collector, CollectorBuilder,
        InteractionCollector, Scope,
    };

    #[cfg(feature = "local-bus")]
    pub use crate::{FinalizedControls, LocalBus};
}
