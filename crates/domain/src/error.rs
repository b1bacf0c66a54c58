//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`SmartHubError`] via `#[from]`.

use crate::id::DeviceId;

/// Top-level error returned by hub operations.
#[derive(Debug, thiserror::Error)]
pub enum SmartHubError {
    /// No device with the given id is registered.
    #[error("device {0} not found")]
    DeviceNotFound(DeviceId),

    /// A device with the given id is already registered.
    #[error("device {0} already exists")]
    DuplicateId(DeviceId),

    #[error(transparent)]
    InvalidCommand(#[from] InvalidCommandError),

    #[error(transparent)]
    InvalidAttribute(#[from] InvalidAttributeError),

    /// No routine with the given name is registered.
    #[error("routine {0:?} not found")]
    RoutineNotFound(String),

    #[error(transparent)]
    InvalidConfiguration(#[from] ConfigurationError),

    /// Failure reported by a storage adapter.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A trigger that a device cannot accept.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidCommandError {
    /// The device kind declares no transition with this trigger at all.
    #[error("{kind} devices do not support the command {trigger:?}")]
    UnknownTrigger { kind: &'static str, trigger: String },

    /// The trigger exists but has no transition from the current state.
    #[error("command {trigger:?} is not valid from state {state:?}")]
    NotAllowed { trigger: String, state: &'static str },
}

/// An attribute value that failed validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidAttributeError {
    #[error("brightness must be between 0 and 100, got {0}")]
    Brightness(i64),

    #[error("wattage must be a non-negative integer, got {0}")]
    Wattage(i64),

    #[error("energy consumption must be a finite non-negative number, got {0}")]
    Consumption(f64),

    #[error("unknown color {0:?}, expected warm, cool or neutral")]
    Color(String),

    /// The device kind has no such attribute.
    #[error("{kind} devices have no attribute {name:?}")]
    Unsupported {
        kind: &'static str,
        name: &'static str,
    },

    /// An argument was present but had the wrong JSON type.
    #[error("argument {name:?} has an invalid value: {value}")]
    Argument {
        name: &'static str,
        value: serde_json::Value,
    },
}

/// The persisted configuration could not be turned into a hub.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// The document itself is not valid JSON for the snapshot schema.
    #[error("malformed configuration document")]
    Malformed(#[source] serde_json::Error),

    /// A single device record is invalid; names the offending record.
    #[error("invalid device record #{index} ({id}): {reason}")]
    DeviceRecord {
        index: usize,
        id: String,
        reason: String,
    },

    /// Two device records share the same id.
    #[error("duplicate device id {0} in configuration")]
    DuplicateDevice(DeviceId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_name_device_in_not_found_message() {
        let err = SmartHubError::DeviceNotFound(DeviceId::from("door_front"));
        assert_eq!(err.to_string(), "device door_front not found");
    }

    #[test]
    fn should_convert_invalid_command_into_hub_error() {
        let err: SmartHubError = InvalidCommandError::UnknownTrigger {
            kind: "DOOR",
            trigger: "turn_on".to_string(),
        }
        .into();
        assert!(matches!(err, SmartHubError::InvalidCommand(_)));
        assert_eq!(
            err.to_string(),
            "DOOR devices do not support the command \"turn_on\""
        );
    }

    #[test]
    fn should_name_record_in_configuration_error() {
        let err = ConfigurationError::DeviceRecord {
            index: 2,
            id: "lamp".to_string(),
            reason: "missing field `kind`".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid device record #2 (lamp): missing field `kind`"
        );
    }
}
