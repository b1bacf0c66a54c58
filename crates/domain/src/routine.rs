//! Routine: a named, ordered batch of device commands.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::DeviceId;

/// One command of a routine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineStep {
    #[serde(rename = "id")]
    pub device_id: DeviceId,
    #[serde(rename = "command")]
    pub trigger: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

impl RoutineStep {
    #[must_use]
    pub fn new(device_id: impl Into<DeviceId>, trigger: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            trigger: trigger.into(),
            args: serde_json::Value::Null,
        }
    }

    #[must_use]
    pub fn with_args(mut self, args: serde_json::Value) -> Self {
        self.args = args;
        self
    }
}

impl fmt::Display for RoutineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.trigger, self.device_id)
    }
}

/// A named sequence of steps, executed in order.
///
/// A failing step does not abort the remaining ones.
#[derive(Debug, Clone, PartialEq)]
pub struct Routine {
    pub name: String,
    pub steps: Vec<RoutineStep>,
}

impl Routine {
    #[must_use]
    pub fn new(name: impl Into<String>, steps: Vec<RoutineStep>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_deserialize_step_with_wire_field_names() {
        let json = serde_json::json!({
            "id": "lamp_1",
            "command": "set_brightness",
            "args": {"brightness": 30}
        });
        let step: RoutineStep = serde_json::from_value(json).unwrap();
        assert_eq!(step.device_id.as_str(), "lamp_1");
        assert_eq!(step.trigger, "set_brightness");
        assert_eq!(step.args["brightness"], 30);
    }

    #[test]
    fn should_default_missing_args_to_null() {
        let json = serde_json::json!({"id": "door", "command": "lock"});
        let step: RoutineStep = serde_json::from_value(json).unwrap();
        assert!(step.args.is_null());
    }

    #[test]
    fn should_display_step_as_call() {
        assert_eq!(RoutineStep::new("door", "lock").to_string(), "lock(door)");
    }
}
