//! Event: an immutable record of something that happened.
//!
//! The hub produces events when devices are added or removed and when a
//! command changes a device's state. Events are never mutated once created.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::device::DeviceKind;
use crate::id::{DeviceId, EventId};
use crate::time::Timestamp;

/// Discriminant of an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    DeviceAdded,
    DeviceRemoved,
    CommandExecuted,
}

impl EventType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DeviceAdded => "DeviceAdded",
            Self::DeviceRemoved => "DeviceRemoved",
            Self::CommandExecuted => "CommandExecuted",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Details of a command that moved a device to another state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandExecuted {
    pub trigger: String,
    #[serde(default)]
    pub args: serde_json::Value,
    pub state_before: String,
    pub state_after: String,
}

/// Type-specific payload of an [`Event`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    DeviceAdded { kind: DeviceKind },
    DeviceRemoved { kind: DeviceKind },
    CommandExecuted(CommandExecuted),
}

/// A timestamped fact about one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: Timestamp,
    pub device_id: DeviceId,
    pub payload: EventPayload,
}

impl Event {
    #[must_use]
    pub fn device_added(device_id: DeviceId, kind: DeviceKind, timestamp: Timestamp) -> Self {
        Self::new(device_id, EventPayload::DeviceAdded { kind }, timestamp)
    }

    #[must_use]
    pub fn device_removed(device_id: DeviceId, kind: DeviceKind, timestamp: Timestamp) -> Self {
        Self::new(device_id, EventPayload::DeviceRemoved { kind }, timestamp)
    }

    #[must_use]
    pub fn command_executed(
        device_id: DeviceId,
        command: CommandExecuted,
        timestamp: Timestamp,
    ) -> Self {
        Self::new(device_id, EventPayload::CommandExecuted(command), timestamp)
    }

    fn new(device_id: DeviceId, payload: EventPayload, timestamp: Timestamp) -> Self {
        Self {
            id: EventId::new(),
            timestamp,
            device_id,
            payload,
        }
    }

    #[must_use]
    pub fn event_type(&self) -> EventType {
        match self.payload {
            EventPayload::DeviceAdded { .. } => EventType::DeviceAdded,
            EventPayload::DeviceRemoved { .. } => EventType::DeviceRemoved,
            EventPayload::CommandExecuted(_) => EventType::CommandExecuted,
        }
    }

    /// The durable-log row for this event, if it records a state change.
    #[must_use]
    pub fn to_log_record(&self) -> Option<LogRecord> {
        match &self.payload {
            EventPayload::CommandExecuted(cmd) if cmd.state_before != cmd.state_after => {
                Some(LogRecord {
                    timestamp: self.timestamp,
                    device_id: self.device_id.clone(),
                    command: cmd.trigger.clone(),
                    state_before: cmd.state_before.clone(),
                    state_after: cmd.state_after.clone(),
                })
            }
            _ => None,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            EventPayload::DeviceAdded { kind } | EventPayload::DeviceRemoved { kind } => write!(
                f,
                "[EVENT] {}: {{id: {}, kind: {kind}}}",
                self.event_type(),
                self.device_id
            ),
            EventPayload::CommandExecuted(cmd) => write!(
                f,
                "[EVENT] {}: {{id: {}, command: {}, before: {}, after: {}}}",
                self.event_type(),
                self.device_id,
                cmd.trigger,
                cmd.state_before,
                cmd.state_after
            ),
        }
    }
}

/// One row of the durable event log.
///
/// Only state-changing commands are persisted; reports are computed from
/// these rows alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: Timestamp,
    pub device_id: DeviceId,
    pub command: String,
    pub state_before: String,
    pub state_after: String,
}
