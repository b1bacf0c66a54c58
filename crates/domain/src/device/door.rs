//! Door: `locked`, `unlocked`, `open`.

use super::DeviceKind;
use super::machine::{Guard, GuardVerdict, SideEffect, StateMachine, Transition};

pub const LOCKED: &str = "locked";
pub const UNLOCKED: &str = "unlocked";
pub const OPEN: &str = "open";

/// A door that counts attempts to lock it while open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Door {
    invalid_attempts: u32,
}

impl Door {
    /// Number of times someone tried to lock this door while it was open.
    #[must_use]
    pub fn invalid_attempts(&self) -> u32 {
        self.invalid_attempts
    }

    /// Restore the counter from a persisted snapshot.
    pub fn restore_invalid_attempts(&mut self, attempts: u32) {
        self.invalid_attempts = attempts;
    }
}

impl StateMachine for Door {
    const KIND: DeviceKind = DeviceKind::Door;
    const STATES: &'static [&'static str] = &[LOCKED, UNLOCKED, OPEN];
    const INITIAL: &'static str = LOCKED;
    // `lock` is also declared from `open` so that the guard, not the table
    // lookup, rejects it and records the attempt.
    const TRANSITIONS: &'static [Transition] = &[
        Transition::new("open", UNLOCKED, OPEN),
        Transition::new("close", OPEN, UNLOCKED),
        Transition::new("lock", UNLOCKED, LOCKED).guarded(Guard::DoorNotOpen),
        Transition::new("lock", OPEN, LOCKED).guarded(Guard::DoorNotOpen),
        Transition::new("unlock", LOCKED, UNLOCKED),
    ];

    fn evaluate_guard(&self, guard: Guard, state: &'static str) -> GuardVerdict {
        match guard {
            Guard::DoorNotOpen if state == OPEN => {
                GuardVerdict::Block(Some(SideEffect::InvalidLockAttempt))
            }
            _ => GuardVerdict::Allow,
        }
    }

    fn apply_side_effect(&mut self, effect: SideEffect) {
        match effect {
            SideEffect::InvalidLockAttempt => {
                self.invalid_attempts = self.invalid_attempts.saturating_add(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::machine::fire;
    use crate::time::now;

    fn run(door: &mut Door, state: &mut &'static str, trigger: &str) -> bool {
        fire(door, state, trigger, &serde_json::Value::Null, now())
            .unwrap()
            .fired
    }

    #[test]
    fn should_start_locked() {
        assert_eq!(Door::INITIAL, LOCKED);
    }

    #[test]
    fn should_count_lock_attempt_while_open() {
        let mut door = Door::default();
        let mut state = Door::INITIAL;

        assert!(run(&mut door, &mut state, "unlock"));
        assert!(run(&mut door, &mut state, "open"));
        assert!(!run(&mut door, &mut state, "lock"));

        assert_eq!(state, OPEN);
        assert_eq!(door.invalid_attempts(), 1);
    }

    #[test]
    fn should_lock_after_closing() {
        let mut door = Door::default();
        let mut state = OPEN;

        assert!(run(&mut door, &mut state, "close"));
        assert!(run(&mut door, &mut state, "lock"));

        assert_eq!(state, LOCKED);
        assert_eq!(door.invalid_attempts(), 0);
    }

    #[test]
    fn should_refuse_to_open_a_locked_door() {
        let mut door = Door::default();
        let mut state = Door::INITIAL;

        let result = fire(&mut door, &mut state, "open", &serde_json::Value::Null, now());

        assert!(result.is_err());
        assert_eq!(state, LOCKED);
    }
}
