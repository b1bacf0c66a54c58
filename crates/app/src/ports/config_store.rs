//! Config store port: persistence for the hub configuration.

use smarthub_domain::error::SmartHubError;
use smarthub_domain::snapshot::Snapshot;

/// Loads and saves the whole hub configuration at once.
pub trait ConfigStore {
    /// Read the stored configuration, or `None` when nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::InvalidConfiguration`] for a malformed
    /// document and [`SmartHubError::Storage`] for I/O failures.
    fn load(&self) -> Result<Option<Snapshot>, SmartHubError>;

    /// Replace the stored configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::Storage`] when the write fails; the previous
    /// configuration must then be left intact.
    fn save(&self, snapshot: &Snapshot) -> Result<(), SmartHubError>;
}
