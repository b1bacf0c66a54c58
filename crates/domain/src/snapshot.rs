//! Snapshot: the persisted configuration schema.
//!
//! A snapshot holds the hub metadata, every device (kind, state and
//! kind-specific attributes) and the routine table. Loading validates each
//! device record independently so that errors can name the offending record;
//! a single bad record fails the whole load.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::device::{Color, Device, DeviceKind, DeviceRegistry};
use crate::error::{ConfigurationError, InvalidAttributeError};
use crate::id::DeviceId;
use crate::routine::{Routine, RoutineStep};
use crate::time::Timestamp;

/// Descriptive metadata about the hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubInfo {
    pub name: String,
    pub version: String,
}

impl Default for HubInfo {
    fn default() -> Self {
        Self {
            name: "smarthub".to_string(),
            version: "1.0".to_string(),
        }
    }
}

/// Kind-specific attributes of a device record. Irrelevant keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wattage: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumption_wh: Option<f64>,
    /// Start of the running powered interval of a metered appliance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub powered_since: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_attempts: Option<u32>,
}

/// A persisted device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub id: DeviceId,
    pub kind: DeviceKind,
    pub name: String,
    pub state: String,
    #[serde(default)]
    pub attributes: AttributeRecord,
}

impl DeviceRecord {
    /// Capture a live device.
    #[must_use]
    pub fn from_device(device: &Device) -> Self {
        let mut attributes = AttributeRecord::default();
        if let Some(door) = device.as_door() {
            attributes.invalid_attempts = Some(door.invalid_attempts());
        }
        if let Some(light) = device.as_light() {
            attributes.brightness = Some(i64::from(light.brightness()));
            attributes.color = Some(light.color().to_string());
        }
        if let Some(meter) = device.meter() {
            attributes.wattage = Some(i64::from(meter.wattage()));
            attributes.consumption_wh = Some(meter.consumption_wh());
            attributes.powered_since = meter.powered_since();
        }
        Self {
            id: device.id().clone(),
            kind: device.kind(),
            name: device.name.clone(),
            state: device.state().to_string(),
            attributes,
        }
    }

    /// Materialize the record through the registry, validating state and
    /// attributes. The error is a human-readable reason.
    fn into_device(self, registry: &DeviceRegistry) -> Result<Device, String> {
        if !self.id.is_valid() {
            return Err("device id must be non-empty and contain no whitespace".to_string());
        }
        let mut device = registry
            .create(self.kind, self.id, self.name)
            .ok_or_else(|| format!("device kind {} is not registered", self.kind))?;
        device.restore_state(&self.state).map_err(|err| err.to_string())?;

        let attrs = self.attributes;
        if let Some(door) = device.as_door_mut()
            && let Some(attempts) = attrs.invalid_attempts
        {
            door.restore_invalid_attempts(attempts);
        }
        if let Some(light) = device.as_light_mut() {
            if let Some(brightness) = attrs.brightness {
                light.set_brightness(brightness).map_err(|err| err.to_string())?;
            }
            if let Some(color) = attrs.color.as_deref() {
                let color: Color = color.parse().map_err(|err: InvalidAttributeError| err.to_string())?;
                light.set_color(color);
            }
        }
        if let Some(meter) = device.meter_mut() {
            if let Some(wattage) = attrs.wattage {
                meter.set_wattage(wattage).map_err(|err| err.to_string())?;
            }
            if let Some(wh) = attrs.consumption_wh {
                meter.restore_consumption(wh).map_err(|err| err.to_string())?;
            }
        }
        if let Some(since) = attrs.powered_since {
            device.resume(since);
        }
        Ok(device)
    }
}

/// The whole persisted configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub hub: HubInfo,
    #[serde(default)]
    pub devices: Vec<DeviceRecord>,
    #[serde(default)]
    pub routines: BTreeMap<String, Vec<RoutineStep>>,
}

#[derive(Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    hub: HubInfo,
    #[serde(default)]
    devices: Vec<serde_json::Value>,
    #[serde(default)]
    routines: BTreeMap<String, Vec<RoutineStep>>,
}

impl Snapshot {
    /// Capture live devices and routines.
    pub fn capture<'a>(
        hub: HubInfo,
        devices: impl IntoIterator<Item = &'a Device>,
        routines: impl IntoIterator<Item = &'a Routine>,
    ) -> Self {
        Self {
            hub,
            devices: devices.into_iter().map(DeviceRecord::from_device).collect(),
            routines: routines
                .into_iter()
                .map(|r| (r.name.clone(), r.steps.clone()))
                .collect(),
        }
    }

    /// Parse a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Malformed`] when the document is not
    /// valid JSON for the schema, and [`ConfigurationError::DeviceRecord`]
    /// naming the first device record that is missing fields or has wrongly
    /// typed ones.
    pub fn from_json(text: &str) -> Result<Self, ConfigurationError> {
        let raw: RawSnapshot = serde_json::from_str(text).map_err(ConfigurationError::Malformed)?;
        let devices = raw
            .devices
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                let id = record_label(&value);
                serde_json::from_value(value).map_err(|err| ConfigurationError::DeviceRecord {
                    index,
                    id,
                    reason: err.to_string(),
                })
            })
            .collect::<Result<Vec<DeviceRecord>, _>>()?;
        Ok(Self {
            hub: raw.hub,
            devices,
            routines: raw.routines,
        })
    }

    /// Render as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Propagates serializer failures (non-finite floats).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Turn the records into live devices and routines.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::DeviceRecord`] naming the first invalid
    /// record, or [`ConfigurationError::DuplicateDevice`] when two records
    /// share an id. Nothing is returned on failure.
    pub fn restore(
        self,
        registry: &DeviceRegistry,
    ) -> Result<(Vec<Device>, Vec<Routine>), ConfigurationError> {
        let mut seen = HashSet::new();
        let mut devices = Vec::with_capacity(self.devices.len());
        for (index, record) in self.devices.into_iter().enumerate() {
            let id = record.id.clone();
            let device = record
                .into_device(registry)
                .map_err(|reason| ConfigurationError::DeviceRecord {
                    index,
                    id: id.to_string(),
                    reason,
                })?;
            if !seen.insert(id.clone()) {
                return Err(ConfigurationError::DuplicateDevice(id));
            }
            devices.push(device);
        }
        let routines = self
            .routines
            .into_iter()
            .map(|(name, steps)| Routine::new(name, steps))
            .collect();
        Ok((devices, routines))
    }
}

fn record_label(value: &serde_json::Value) -> String {
    value
        .get("id")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("<no id>")
        .to_string()
}
