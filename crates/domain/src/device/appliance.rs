//! Microwave and TV: `off`, `on`, `in_use`, metered while `in_use`.
//!
//! Both kinds share the same machine and only differ in their kind and
//! default rated power.

use crate::time::Timestamp;

use super::DeviceKind;
use super::machine::{StateMachine, Transition};
use super::meter::EnergyMeter;

pub const OFF: &str = "off";
pub const ON: &str = "on";
pub const IN_USE: &str = "in_use";

const TRANSITIONS: &[Transition] = &[
    Transition::new("turn_on", OFF, ON),
    Transition::new("turn_off", ON, OFF),
    Transition::new("start", ON, IN_USE),
    Transition::new("stop", IN_USE, ON),
];

macro_rules! define_appliance {
    ($(#[doc = $doc:expr])* $name:ident, $kind:expr, $wattage:expr) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            meter: EnergyMeter,
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    meter: EnergyMeter::new($wattage),
                }
            }
        }

        impl $name {
            /// Rated power used when none is configured.
            pub const DEFAULT_WATTAGE: u32 = $wattage;

            #[must_use]
            pub fn meter(&self) -> &EnergyMeter {
                &self.meter
            }

            pub fn meter_mut(&mut self) -> &mut EnergyMeter {
                &mut self.meter
            }
        }

        impl StateMachine for $name {
            const KIND: DeviceKind = $kind;
            const STATES: &'static [&'static str] = &[OFF, ON, IN_USE];
            const INITIAL: &'static str = OFF;
            const TRANSITIONS: &'static [Transition] = TRANSITIONS;

            fn on_exit(&mut self, state: &'static str, at: Timestamp) {
                if state == IN_USE {
                    self.meter.stop(at);
                }
            }

            fn on_enter(&mut self, state: &'static str, at: Timestamp) {
                if state == IN_USE {
                    self.meter.start(at);
                }
            }
        }
    };
}

define_appliance!(
    /// A microwave oven.
    Microwave,
    DeviceKind::Microwave,
    1100
);

define_appliance!(
    /// A television.
    Tv,
    DeviceKind::Tv,
    110
);
