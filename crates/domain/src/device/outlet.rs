//! Smart outlet: `off`, `on`, metered while `on`.

use crate::time::Timestamp;

use super::DeviceKind;
use super::machine::{StateMachine, Transition};
use super::meter::EnergyMeter;

pub const OFF: &str = "off";
pub const ON: &str = "on";

pub const DEFAULT_WATTAGE: u32 = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct Outlet {
    meter: EnergyMeter,
}

impl Default for Outlet {
    fn default() -> Self {
        Self {
            meter: EnergyMeter::new(DEFAULT_WATTAGE),
        }
    }
}

impl Outlet {
    #[must_use]
    pub fn meter(&self) -> &EnergyMeter {
        &self.meter
    }

    pub fn meter_mut(&mut self) -> &mut EnergyMeter {
        &mut self.meter
    }
}

impl StateMachine for Outlet {
    const KIND: DeviceKind = DeviceKind::Outlet;
    const STATES: &'static [&'static str] = &[OFF, ON];
    const INITIAL: &'static str = OFF;
    const TRANSITIONS: &'static [Transition] = &[
        Transition::new("turn_on", OFF, ON),
        Transition::new("turn_off", ON, OFF),
    ];

    fn on_exit(&mut self, state: &'static str, at: Timestamp) {
        if state == ON {
            self.meter.stop(at);
        }
    }

    fn on_enter(&mut self, state: &'static str, at: Timestamp) {
        if state == ON {
            self.meter.start(at);
        }
    }
}
