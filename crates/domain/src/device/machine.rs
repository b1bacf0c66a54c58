//! Table-driven finite-state machine shared by every device kind.
//!
//! A kind declares its states and transitions as `const` tables and
//! implements the hooks it needs (guards, side effects, enter/exit). Trigger
//! names are resolved against the table at call time.

use crate::error::{InvalidAttributeError, InvalidCommandError, SmartHubError};
use crate::time::Timestamp;

use super::DeviceKind;

/// A single `(trigger, source) -> dest` edge, optionally guarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub trigger: &'static str,
    pub source: &'static str,
    pub dest: &'static str,
    pub guard: Option<Guard>,
}

impl Transition {
    #[must_use]
    pub const fn new(trigger: &'static str, source: &'static str, dest: &'static str) -> Self {
        Self {
            trigger,
            source,
            dest,
            guard: None,
        }
    }

    #[must_use]
    pub const fn guarded(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }
}

/// Named guard predicates. Each kind evaluates the guards it declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// A door can only be locked when it is not open.
    DoorNotOpen,
    /// The light's brightness is within `0..=100`.
    BrightnessInRange,
    /// The light's color is one of the supported tones.
    ColorValid,
}

/// Side effect requested by a guard that blocked its transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    /// Someone tried to lock an open door.
    InvalidLockAttempt,
}

/// Result of evaluating a guard.
///
/// A blocked guard may still ask for a side effect to be recorded on the
/// device. The invalid-lock-attempts report reads that record, so this is
/// part of the contract and not an accident of implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardVerdict {
    Allow,
    Block(Option<SideEffect>),
}

/// What happened when a trigger was fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FireOutcome {
    pub before: &'static str,
    pub after: &'static str,
    /// `false` when a guard blocked the transition. A fired self-loop has
    /// `fired == true` and `before == after`.
    pub fired: bool,
}

impl FireOutcome {
    /// Whether the device ended up in a different state.
    #[must_use]
    pub fn state_changed(&self) -> bool {
        self.before != self.after
    }
}

/// Static description and hooks of one device kind's state machine.
pub trait StateMachine {
    const KIND: DeviceKind;
    /// Every state the kind can be in. Device state is always one of these.
    const STATES: &'static [&'static str];
    const INITIAL: &'static str;
    /// `(trigger, source)` pairs must be unique.
    const TRANSITIONS: &'static [Transition];

    fn evaluate_guard(&self, _guard: Guard, _state: &'static str) -> GuardVerdict {
        GuardVerdict::Allow
    }

    fn apply_side_effect(&mut self, _effect: SideEffect) {}

    /// Apply the attribute writes carried by a command's arguments.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidAttributeError`] when an argument fails validation.
    fn apply_arguments(
        &mut self,
        _trigger: &str,
        _args: &serde_json::Value,
    ) -> Result<(), InvalidAttributeError> {
        Ok(())
    }

    fn on_exit(&mut self, _state: &'static str, _at: Timestamp) {}

    fn on_enter(&mut self, _state: &'static str, _at: Timestamp) {}
}

/// Whether the kind declares `trigger` from any source state.
#[must_use]
pub fn supports<M: StateMachine>(trigger: &str) -> bool {
    M::TRANSITIONS.iter().any(|t| t.trigger == trigger)
}

/// Resolve a state name to the kind's interned state.
#[must_use]
pub fn find_state<M: StateMachine>(name: &str) -> Option<&'static str> {
    M::STATES.iter().copied().find(|s| *s == name)
}

/// Triggers accepted from `state`, in table order, without duplicates.
#[must_use]
pub fn triggers_from<M: StateMachine>(state: &str) -> Vec<&'static str> {
    let mut triggers: Vec<&'static str> = Vec::new();
    for t in M::TRANSITIONS.iter().filter(|t| t.source == state) {
        if !triggers.contains(&t.trigger) {
            triggers.push(t.trigger);
        }
    }
    triggers
}

/// Attempt a transition.
///
/// Order of operations: table lookup, argument application, guard, then
/// exit hook of the source, state mutation, enter hook of the destination.
///
/// # Errors
///
/// Returns [`SmartHubError::InvalidCommand`] when the trigger is unknown to
/// the kind or has no transition from the current state, and
/// [`SmartHubError::InvalidAttribute`] when an argument is rejected.
pub fn fire<M: StateMachine>(
    machine: &mut M,
    state: &mut &'static str,
    trigger: &str,
    args: &serde_json::Value,
    at: Timestamp,
) -> Result<FireOutcome, SmartHubError> {
    let before = *state;
    let Some(transition) = M::TRANSITIONS
        .iter()
        .find(|t| t.trigger == trigger && t.source == before)
    else {
        let err = if supports::<M>(trigger) {
            InvalidCommandError::NotAllowed {
                trigger: trigger.to_string(),
                state: before,
            }
        } else {
            InvalidCommandError::UnknownTrigger {
                kind: M::KIND.as_str(),
                trigger: trigger.to_string(),
            }
        };
        return Err(err.into());
    };

    machine.apply_arguments(trigger, args)?;

    if let Some(guard) = transition.guard
        && let GuardVerdict::Block(effect) = machine.evaluate_guard(guard, before)
    {
        if let Some(effect) = effect {
            machine.apply_side_effect(effect);
        }
        return Ok(FireOutcome {
            before,
            after: before,
            fired: false,
        });
    }

    machine.on_exit(before, at);
    *state = transition.dest;
    machine.on_enter(transition.dest, at);

    Ok(FireOutcome {
        before,
        after: transition.dest,
        fired: true,
    })
}
