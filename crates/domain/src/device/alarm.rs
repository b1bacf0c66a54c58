//! Alarm: `off`, `on` (armed), `triggered`.

use super::DeviceKind;
use super::machine::{StateMachine, Transition};

pub const OFF: &str = "off";
pub const ON: &str = "on";
pub const TRIGGERED: &str = "triggered";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Alarm;

impl StateMachine for Alarm {
    const KIND: DeviceKind = DeviceKind::Alarm;
    const STATES: &'static [&'static str] = &[OFF, ON, TRIGGERED];
    const INITIAL: &'static str = OFF;
    const TRANSITIONS: &'static [Transition] = &[
        Transition::new("arm", OFF, ON),
        Transition::new("disarm", ON, OFF),
        Transition::new("trip", ON, TRIGGERED),
        Transition::new("clear", TRIGGERED, ON),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::machine::{fire, triggers_from};
    use crate::time::now;

    #[test]
    fn should_trip_only_when_armed() {
        let mut alarm = Alarm;
        let mut state = Alarm::INITIAL;
        let args = serde_json::Value::Null;

        assert!(fire(&mut alarm, &mut state, "trip", &args, now()).is_err());

        fire(&mut alarm, &mut state, "arm", &args, now()).unwrap();
        fire(&mut alarm, &mut state, "trip", &args, now()).unwrap();
        assert_eq!(state, TRIGGERED);

        fire(&mut alarm, &mut state, "clear", &args, now()).unwrap();
        assert_eq!(state, ON);
    }

    #[test]
    fn should_offer_disarm_and_trip_when_armed() {
        assert_eq!(triggers_from::<Alarm>(ON), vec!["disarm", "trip"]);
    }
}
