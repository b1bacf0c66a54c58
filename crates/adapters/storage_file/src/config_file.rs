//! JSON file implementation of [`ConfigStore`].

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use smarthub_app::ports::ConfigStore;
use smarthub_domain::error::SmartHubError;
use smarthub_domain::snapshot::Snapshot;
use tempfile::NamedTempFile;

use crate::error::StorageError;

/// Configuration stored as one pretty-printed JSON document.
///
/// Saving writes a temporary file in the target's directory and persists it
/// over the target, so readers never observe a half-written document.
#[derive(Debug, Clone)]
pub struct JsonConfigStore {
    path: PathBuf,
}

impl JsonConfigStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, snapshot: &Snapshot) -> Result<(), StorageError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(StorageError::io(dir))?;
        let body = snapshot.to_json_pretty()?;
        let mut temp = NamedTempFile::new_in(dir).map_err(StorageError::io(dir))?;
        temp.write_all(body.as_bytes())
            .map_err(StorageError::io(temp.path()))?;
        temp.persist(&self.path)
            .map_err(|err| StorageError::io(&self.path)(err.error))?;
        Ok(())
    }
}

impl ConfigStore for JsonConfigStore {
    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<Option<Snapshot>, SmartHubError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!("configuration file does not exist");
                return Ok(None);
            }
            Err(err) => return Err(StorageError::io(&self.path)(err).into()),
        };
        let snapshot = Snapshot::from_json(&text)?;
        Ok(Some(snapshot))
    }

    #[tracing::instrument(skip(self, snapshot), fields(path = %self.path.display()))]
    fn save(&self, snapshot: &Snapshot) -> Result<(), SmartHubError> {
        self.write(snapshot)?;
        tracing::debug!(devices = snapshot.devices.len(), "configuration written");
        Ok(())
    }
}
