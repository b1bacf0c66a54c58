//! Device: a simulated appliance governed by its own finite-state machine.
//!
//! Every kind (door, light, outlet, alarm, microwave, TV) implements
//! [`StateMachine`] with a static transition table. [`Device`] wraps the
//! kind-specific model together with the identity, display name and current
//! state shared by all kinds.

mod alarm;
mod appliance;
mod door;
mod light;
pub mod machine;
mod meter;
mod outlet;
mod registry;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{InvalidAttributeError, SmartHubError};
use crate::id::DeviceId;
use crate::time::Timestamp;

pub use alarm::Alarm;
pub use appliance::{Microwave, Tv};
pub use door::Door;
pub use light::{Color, Light};
pub use machine::{FireOutcome, StateMachine};
pub use meter::EnergyMeter;
pub use outlet::Outlet;
pub use registry::{Constructor, DeviceRegistry};

/// The closed set of supported device kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DeviceKind {
    Door,
    Light,
    Outlet,
    Alarm,
    Microwave,
    Tv,
}

impl DeviceKind {
    pub const ALL: [Self; 6] = [
        Self::Door,
        Self::Light,
        Self::Outlet,
        Self::Alarm,
        Self::Microwave,
        Self::Tv,
    ];

    /// Wire name used in configuration files and reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Door => "DOOR",
            Self::Light => "LIGHT",
            Self::Outlet => "OUTLET",
            Self::Alarm => "ALARM",
            Self::Microwave => "MICROWAVE",
            Self::Tv => "TV",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A device kind name that is not part of the supported set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown device kind {0:?}")]
pub struct UnknownKindError(pub String);

impl FromStr for DeviceKind {
    type Err = UnknownKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownKindError(s.to_string()))
    }
}

impl TryFrom<String> for DeviceKind {
    type Error = UnknownKindError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DeviceKind> for String {
    fn from(kind: DeviceKind) -> Self {
        kind.as_str().to_string()
    }
}

/// A state name that the device kind does not declare.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} devices have no state {state:?}")]
pub struct UnknownStateError {
    pub kind: DeviceKind,
    pub state: String,
}

/// A user-settable attribute together with its new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Brightness(i64),
    Color(Color),
    Wattage(i64),
}

impl Attribute {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Brightness(_) => "brightness",
            Self::Color(_) => "color",
            Self::Wattage(_) => "wattage",
        }
    }
}

/// Kind-specific model of a device.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceModel {
    Door(Door),
    Light(Light),
    Outlet(Outlet),
    Alarm(Alarm),
    Microwave(Microwave),
    Tv(Tv),
}

macro_rules! with_machine {
    ($model:expr, $m:ident, $ty:ident => $body:expr) => {
        match $model {
            DeviceModel::Door($m) => {
                type $ty = Door;
                $body
            }
            DeviceModel::Light($m) => {
                type $ty = Light;
                $body
            }
            DeviceModel::Outlet($m) => {
                type $ty = Outlet;
                $body
            }
            DeviceModel::Alarm($m) => {
                type $ty = Alarm;
                $body
            }
            DeviceModel::Microwave($m) => {
                type $ty = Microwave;
                $body
            }
            DeviceModel::Tv($m) => {
                type $ty = Tv;
                $body
            }
        }
    };
}

impl DeviceModel {
    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        with_machine!(self, _m, M => M::KIND)
    }

    fn initial_state(&self) -> &'static str {
        with_machine!(self, _m, M => M::INITIAL)
    }

    fn states(&self) -> &'static [&'static str] {
        with_machine!(self, _m, M => M::STATES)
    }

    fn supports(&self, trigger: &str) -> bool {
        with_machine!(self, _m, M => machine::supports::<M>(trigger))
    }

    fn triggers_from(&self, state: &str) -> Vec<&'static str> {
        with_machine!(self, _m, M => machine::triggers_from::<M>(state))
    }

    fn find_state(&self, name: &str) -> Option<&'static str> {
        with_machine!(self, _m, M => machine::find_state::<M>(name))
    }
}

/// A device registered in the hub.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    id: DeviceId,
    pub name: String,
    state: &'static str,
    model: DeviceModel,
}

impl Device {
    /// Create a device in its kind's initial state.
    #[must_use]
    pub fn new(id: impl Into<DeviceId>, name: impl Into<String>, model: DeviceModel) -> Self {
        let state = model.initial_state();
        Self {
            id: id.into(),
            name: name.into(),
            state,
            model,
        }
    }

    #[must_use]
    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        self.model.kind()
    }

    /// Current state; always one of [`states`](Self::states).
    #[must_use]
    pub fn state(&self) -> &'static str {
        self.state
    }

    /// Every state the device's kind declares.
    #[must_use]
    pub fn states(&self) -> &'static [&'static str] {
        self.model.states()
    }

    #[must_use]
    pub fn model(&self) -> &DeviceModel {
        &self.model
    }

    /// Whether the kind declares `trigger` at all, regardless of state.
    #[must_use]
    pub fn supports(&self, trigger: &str) -> bool {
        self.model.supports(trigger)
    }

    /// Triggers accepted from the current state.
    #[must_use]
    pub fn available_triggers(&self) -> Vec<&'static str> {
        self.model.triggers_from(self.state)
    }

    /// Fire a trigger against the device's state machine.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::InvalidCommand`] when the trigger is unknown
    /// or not valid from the current state, and
    /// [`SmartHubError::InvalidAttribute`] when an argument is rejected.
    pub fn fire(
        &mut self,
        trigger: &str,
        args: &serde_json::Value,
        at: Timestamp,
    ) -> Result<FireOutcome, SmartHubError> {
        let state = &mut self.state;
        with_machine!(&mut self.model, m, _M => machine::fire(m, state, trigger, args, at))
    }

    /// Force the current state, e.g. when restoring a snapshot. No hooks run.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownStateError`] when the kind does not declare `state`.
    pub fn restore_state(&mut self, state: &str) -> Result<(), UnknownStateError> {
        self.state = self
            .model
            .find_state(state)
            .ok_or_else(|| UnknownStateError {
                kind: self.kind(),
                state: state.to_string(),
            })?;
        Ok(())
    }

    /// Re-enter the current state at `at` without changing it, restarting
    /// whatever the state's enter hook tracks (the energy meter of a powered
    /// appliance). Used after restoring a snapshot.
    pub fn resume(&mut self, at: Timestamp) {
        let state = self.state;
        with_machine!(&mut self.model, m, _M => m.on_enter(state, at));
    }

    /// Write an attribute directly, outside of any transition.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidAttributeError::Unsupported`] when the kind has no
    /// such attribute, or the setter's validation error. The device is left
    /// unchanged on error.
    pub fn set_attribute(&mut self, attribute: Attribute) -> Result<(), InvalidAttributeError> {
        let kind = self.kind().as_str();
        let unsupported = InvalidAttributeError::Unsupported {
            kind,
            name: attribute.name(),
        };
        match attribute {
            Attribute::Brightness(value) => self
                .as_light_mut()
                .ok_or(unsupported)?
                .set_brightness(value),
            Attribute::Color(color) => {
                self.as_light_mut().ok_or(unsupported)?.set_color(color);
                Ok(())
            }
            Attribute::Wattage(watts) => self.meter_mut().ok_or(unsupported)?.set_wattage(watts),
        }
    }

    #[must_use]
    pub fn as_door(&self) -> Option<&Door> {
        match &self.model {
            DeviceModel::Door(door) => Some(door),
            _ => None,
        }
    }

    pub fn as_door_mut(&mut self) -> Option<&mut Door> {
        match &mut self.model {
            DeviceModel::Door(door) => Some(door),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_light(&self) -> Option<&Light> {
        match &self.model {
            DeviceModel::Light(light) => Some(light),
            _ => None,
        }
    }

    pub fn as_light_mut(&mut self) -> Option<&mut Light> {
        match &mut self.model {
            DeviceModel::Light(light) => Some(light),
            _ => None,
        }
    }

    /// Energy meter of outlets, microwaves and TVs.
    #[must_use]
    pub fn meter(&self) -> Option<&EnergyMeter> {
        match &self.model {
            DeviceModel::Outlet(d) => Some(d.meter()),
            DeviceModel::Microwave(d) => Some(d.meter()),
            DeviceModel::Tv(d) => Some(d.meter()),
            _ => None,
        }
    }

    pub fn meter_mut(&mut self) -> Option<&mut EnergyMeter> {
        match &mut self.model {
            DeviceModel::Outlet(d) => Some(d.meter_mut()),
            DeviceModel::Microwave(d) => Some(d.meter_mut()),
            DeviceModel::Tv(d) => Some(d.meter_mut()),
            _ => None,
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {} | {}", self.id, self.kind(), self.state)
    }
}
