//! Observer port: sinks notified of every hub event.

use std::sync::Arc;

use smarthub_domain::error::SmartHubError;
use smarthub_domain::event::Event;

/// Receives every event the hub emits, in registration order.
///
/// A failing observer is logged by the bus and never aborts the command
/// that produced the event.
pub trait Observer: Send {
    /// Short name used in log messages.
    fn name(&self) -> &str;

    /// Handle one event.
    ///
    /// # Errors
    ///
    /// Returns whatever the sink failed with; the bus only logs it.
    fn notify(&self, event: &Event) -> Result<(), SmartHubError>;
}

impl<T: Observer + Sync> Observer for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn notify(&self, event: &Event) -> Result<(), SmartHubError> {
        (**self).notify(event)
    }
}
