use thiserror::Error;

use crate::entities::{Collected, CollectorEndReason, ComponentInteraction};

/// Errors that can occur while collecting interactions
#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Event bus error: {0}")]
    BusError(String),

    #[error(transparent)]
    Ended(#[from] CollectorEnded<ComponentInteraction>),

    #[error("Hook error: {0}")]
    HookError(#[from] HookError),

    #[error("Finalize error: {0}")]
    FinalizeError(String),
}

impl CollectorError {
    /// The end reason, when the collector ended outside the caller's success reasons
    pub fn end_reason(&self) -> Option<CollectorEndReason> {
        match self {
            CollectorError::Ended(ended) => Some(ended.reason),
            _ => None,
        }
    }
}

/// Error raised by a listener hook
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct HookError {
    message: String,
}

impl HookError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for HookError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for HookError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// The collector ended for a reason the caller did not declare a success.
///
/// Carries whatever was collected before the end.
#[derive(Debug)]
pub struct CollectorEnded<T> {
    pub reason: CollectorEndReason,
    pub collected: Collected<T>,
}

impl<T> std::fmt::Display for CollectorEnded<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Collector ended: {} ({} collected)",
            self.reason,
            self.collected.len()
        )
    }
}

impl<T: std::fmt::Debug> std::error::Error for CollectorEnded<T> {}
