//! Event log port: read access to the durable command history.

use std::sync::Arc;

use smarthub_domain::error::SmartHubError;
use smarthub_domain::event::LogRecord;

/// Source of durable [`LogRecord`]s for the report engine.
pub trait EventLog {
    /// Every persisted record, in file order.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::Storage`] when the log cannot be read. A log
    /// that does not exist yet is empty, not an error.
    fn read_all(&self) -> Result<Vec<LogRecord>, SmartHubError>;
}

impl<T: EventLog> EventLog for Arc<T> {
    fn read_all(&self) -> Result<Vec<LogRecord>, SmartHubError> {
        (**self).read_all()
    }
}
