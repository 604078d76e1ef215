use async_trait::async_trait;

use crate::entities::MessageRef;
use crate::error::CollectorError;

/// Trait for the effect run once a collector bound to a message has ended.
///
/// The usual implementation edits the message so its controls can no longer
/// be pressed, highlighting the `selected` component ids.
#[async_trait]
pub trait ControlFinalizer: Send + Sync {
    async fn disable_controls(
        &self,
        message: &MessageRef,
        selected: &[String],
    ) -> Result<(), CollectorError>;
}

/// Finalizer that leaves the message untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepControls;

#[async_trait]
impl ControlFinalizer for KeepControls {
    async fn disable_controls(
        &self,
        _message: &MessageRef,
        _selected: &[String],
    ) -> Result<(), CollectorError> {
        Ok(())
    }
}
