//! Typed identifiers.
//!
//! Devices are addressed by human-chosen slugs (`door_front`, `lamp_1`), while
//! events get a random UUID so that every observable fact is unique.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique, immutable identifier of a [`Device`](crate::device::Device).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Wrap a device id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id is usable: non-empty and free of whitespace.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty() && !self.0.chars().any(char::is_whitespace)
    }
}

impl From<&str> for DeviceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for DeviceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for an [`Event`](crate::event::Event).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(uuid::Uuid);

impl Default for EventId {
    fn default() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl EventId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_generate_unique_event_ids_when_called_twice() {
        assert_ne!(EventId::new(), EventId::new());
    }

    #[test]
    fn should_serialize_device_id_as_plain_string() {
        let id = DeviceId::from("lamp_1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"lamp_1\"");
    }

    #[test]
    fn should_reject_device_id_with_whitespace() {
        assert!(DeviceId::from("lamp_1").is_valid());
        assert!(!DeviceId::from("living room").is_valid());
        assert!(!DeviceId::from("").is_valid());
    }
}
