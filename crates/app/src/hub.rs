//! Hub: owns the devices, routines and observers; sole mutator of device
//! state.
//!
//! Every state change goes through [`Hub::execute_command`], which emits a
//! `CommandExecuted` event if and only if the device ended up in a different
//! state.

use std::collections::{BTreeMap, HashMap};

use smarthub_domain::device::{Attribute, Device, DeviceRegistry, FireOutcome};
use smarthub_domain::error::{InvalidCommandError, SmartHubError};
use smarthub_domain::event::{CommandExecuted, Event};
use smarthub_domain::id::DeviceId;
use smarthub_domain::routine::{Routine, RoutineStep};
use smarthub_domain::snapshot::{HubInfo, Snapshot};

use crate::bus::ObserverBus;
use crate::ports::{Clock, ConfigStore, Observer};

/// Result of a successfully dispatched command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The device moved to another state; an event was emitted.
    StateChanged {
        before: &'static str,
        after: &'static str,
    },
    /// A `set_*` self-loop fired and updated an attribute. No event.
    AttributeChanged { state: &'static str },
    /// Any other self-loop. No event.
    Unchanged { state: &'static str },
    /// A guard rejected the transition. No event; guard side effects
    /// (the door's invalid-lock counter) still apply.
    GuardBlocked { state: &'static str },
}

impl CommandOutcome {
    fn classify(trigger: &str, fired: FireOutcome) -> Self {
        if !fired.fired {
            Self::GuardBlocked { state: fired.before }
        } else if fired.state_changed() {
            Self::StateChanged {
                before: fired.before,
                after: fired.after,
            }
        } else if trigger.starts_with("set_") {
            Self::AttributeChanged { state: fired.after }
        } else {
            Self::Unchanged { state: fired.after }
        }
    }
}

/// What happened to one routine step.
#[derive(Debug)]
pub enum StepOutcome {
    Executed(CommandOutcome),
    /// The step failed with a missing device or an invalid command and was
    /// skipped.
    Skipped(SmartHubError),
}

#[derive(Debug)]
pub struct StepReport {
    pub step: RoutineStep,
    pub outcome: StepOutcome,
}

/// Per-step results of a routine run.
#[derive(Debug)]
pub struct RoutineReport {
    pub name: String,
    pub steps: Vec<StepReport>,
}

impl RoutineReport {
    #[must_use]
    pub fn executed(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.outcome, StepOutcome::Executed(_)))
            .count()
    }

    pub fn skipped(&self) -> impl Iterator<Item = &StepReport> {
        self.steps
            .iter()
            .filter(|s| matches!(s.outcome, StepOutcome::Skipped(_)))
    }
}

/// The home-automation hub.
pub struct Hub {
    info: HubInfo,
    registry: DeviceRegistry,
    devices: HashMap<DeviceId, Device>,
    order: Vec<DeviceId>,
    routines: BTreeMap<String, Routine>,
    observers: ObserverBus,
    clock: Box<dyn Clock>,
}

impl Hub {
    /// An empty hub using the default device registry.
    pub fn new(clock: impl Clock + 'static) -> Self {
        Self {
            info: HubInfo::default(),
            registry: DeviceRegistry::default(),
            devices: HashMap::new(),
            order: Vec::new(),
            routines: BTreeMap::new(),
            observers: ObserverBus::new(),
            clock: Box::new(clock),
        }
    }

    #[must_use]
    pub fn with_info(mut self, info: HubInfo) -> Self {
        self.info = info;
        self
    }

    /// Build a hub from a configuration snapshot. No events are emitted for
    /// the loaded devices.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::InvalidConfiguration`] naming the first
    /// invalid device record.
    pub fn from_snapshot(snapshot: Snapshot, clock: impl Clock + 'static) -> Result<Self, SmartHubError> {
        let mut hub = Self::new(clock).with_info(snapshot.hub.clone());
        let (devices, routines) = snapshot.restore(&hub.registry)?;
        let loaded_at = hub.clock.now();
        for mut device in devices {
            if device.meter().is_some_and(|meter| !meter.is_running()) {
                device.resume(loaded_at);
            }
            hub.insert(device);
        }
        for routine in routines {
            hub.add_routine(routine);
        }
        tracing::info!(
            devices = hub.order.len(),
            routines = hub.routines.len(),
            "hub restored from configuration"
        );
        Ok(hub)
    }

    /// Load the hub from a store; a store with nothing saved yields an
    /// empty hub.
    ///
    /// # Errors
    ///
    /// Propagates the store's errors and invalid configuration.
    pub fn load(store: &impl ConfigStore, clock: impl Clock + 'static) -> Result<Self, SmartHubError> {
        match store.load()? {
            Some(snapshot) => Self::from_snapshot(snapshot, clock),
            None => {
                tracing::info!("no configuration found, starting with an empty hub");
                Ok(Self::new(clock))
            }
        }
    }

    /// Export devices (in insertion order) and routines.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self.info.clone(), self.list_devices(), self.routines.values())
    }

    /// Persist the current configuration.
    ///
    /// # Errors
    ///
    /// Propagates the store's errors.
    #[tracing::instrument(skip_all)]
    pub fn save(&self, store: &impl ConfigStore) -> Result<(), SmartHubError> {
        store.save(&self.snapshot())?;
        tracing::info!(devices = self.order.len(), "configuration saved");
        Ok(())
    }

    #[must_use]
    pub fn info(&self) -> &HubInfo {
        &self.info
    }

    /// Registry used to build devices from their kind.
    #[must_use]
    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    fn insert(&mut self, device: Device) {
        self.order.push(device.id().clone());
        self.devices.insert(device.id().clone(), device);
    }

    /// Register a device and emit `DeviceAdded`.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::DuplicateId`] when the id is taken; the
    /// existing device is kept.
    #[tracing::instrument(skip(self, device), fields(device_id = %device.id(), kind = %device.kind()))]
    pub fn add_device(&mut self, device: Device) -> Result<(), SmartHubError> {
        if self.devices.contains_key(device.id()) {
            return Err(SmartHubError::DuplicateId(device.id().clone()));
        }
        let event = Event::device_added(device.id().clone(), device.kind(), self.clock.now());
        self.insert(device);
        tracing::info!("device added");
        self.notify(&event);
        Ok(())
    }

    /// Remove a device and emit `DeviceRemoved`.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::DeviceNotFound`] when no device has `id`.
    #[tracing::instrument(skip(self))]
    pub fn remove_device(&mut self, id: &DeviceId) -> Result<Device, SmartHubError> {
        let device = self
            .devices
            .remove(id)
            .ok_or_else(|| SmartHubError::DeviceNotFound(id.clone()))?;
        self.order.retain(|existing| existing != id);
        let event = Event::device_removed(id.clone(), device.kind(), self.clock.now());
        tracing::info!("device removed");
        self.notify(&event);
        Ok(device)
    }

    /// # Errors
    ///
    /// Returns [`SmartHubError::DeviceNotFound`] when no device has `id`.
    pub fn get_device(&self, id: &DeviceId) -> Result<&Device, SmartHubError> {
        self.devices
            .get(id)
            .ok_or_else(|| SmartHubError::DeviceNotFound(id.clone()))
    }

    /// Mutable access for attribute edits. State changes must go through
    /// [`execute_command`](Self::execute_command).
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::DeviceNotFound`] when no device has `id`.
    pub fn get_device_mut(&mut self, id: &DeviceId) -> Result<&mut Device, SmartHubError> {
        self.devices
            .get_mut(id)
            .ok_or_else(|| SmartHubError::DeviceNotFound(id.clone()))
    }

    /// Devices in insertion order.
    #[must_use]
    pub fn list_devices(&self) -> Vec<&Device> {
        self.order
            .iter()
            .filter_map(|id| self.devices.get(id))
            .collect()
    }

    #[must_use]
    pub fn device_count(&self) -> usize {
        self.order.len()
    }

    /// Change an attribute outside of any transition. No event is emitted.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::DeviceNotFound`] or
    /// [`SmartHubError::InvalidAttribute`]; the device is unchanged on error.
    #[tracing::instrument(skip(self))]
    pub fn set_attribute(&mut self, id: &DeviceId, attribute: Attribute) -> Result<(), SmartHubError> {
        self.get_device_mut(id)?.set_attribute(attribute)?;
        tracing::info!(attribute = attribute.name(), "attribute changed");
        Ok(())
    }

    /// Dispatch `trigger` to a device.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::DeviceNotFound`],
    /// [`SmartHubError::InvalidCommand`] when the kind does not declare the
    /// trigger or it is not valid from the current state, and
    /// [`SmartHubError::InvalidAttribute`] for rejected arguments.
    #[tracing::instrument(skip(self, args))]
    pub fn execute_command(
        &mut self,
        id: &DeviceId,
        trigger: &str,
        args: &serde_json::Value,
    ) -> Result<CommandOutcome, SmartHubError> {
        let at = self.clock.now();
        let device = self.get_device_mut(id)?;
        if !device.supports(trigger) {
            return Err(InvalidCommandError::UnknownTrigger {
                kind: device.kind().as_str(),
                trigger: trigger.to_string(),
            }
            .into());
        }
        let fired = device.fire(trigger, args, at)?;
        let outcome = CommandOutcome::classify(trigger, fired);

        match outcome {
            CommandOutcome::StateChanged { before, after } => {
                tracing::info!(before, after, "state changed");
                let event = Event::command_executed(
                    id.clone(),
                    CommandExecuted {
                        trigger: trigger.to_string(),
                        args: args.clone(),
                        state_before: before.to_string(),
                        state_after: after.to_string(),
                    },
                    at,
                );
                self.notify(&event);
            }
            CommandOutcome::AttributeChanged { state } => {
                tracing::info!(state, "attribute changed");
            }
            CommandOutcome::Unchanged { state } => {
                tracing::debug!(state, "command left state unchanged");
            }
            CommandOutcome::GuardBlocked { state } => {
                tracing::warn!(state, "command blocked by guard");
            }
        }
        Ok(outcome)
    }

    /// Register (or replace) a routine.
    pub fn add_routine(&mut self, routine: Routine) {
        self.routines.insert(routine.name.clone(), routine);
    }

    /// Routine names, sorted.
    #[must_use]
    pub fn list_routines(&self) -> Vec<&str> {
        self.routines.keys().map(String::as_str).collect()
    }

    /// Run every step of a routine in order.
    ///
    /// Steps failing with a missing device or an invalid command are logged
    /// and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::RoutineNotFound`], or the first step error
    /// of any other kind, which aborts the remaining steps.
    #[tracing::instrument(skip(self))]
    pub fn execute_routine(&mut self, name: &str) -> Result<RoutineReport, SmartHubError> {
        let routine = self
            .routines
            .get(name)
            .cloned()
            .ok_or_else(|| SmartHubError::RoutineNotFound(name.to_string()))?;

        let mut report = RoutineReport {
            name: routine.name,
            steps: Vec::with_capacity(routine.steps.len()),
        };
        for step in routine.steps {
            let outcome = match self.execute_command(&step.device_id, &step.trigger, &step.args) {
                Ok(outcome) => StepOutcome::Executed(outcome),
                Err(err @ (SmartHubError::DeviceNotFound(_) | SmartHubError::InvalidCommand(_))) => {
                    tracing::warn!(step = %step, error = %err, "routine step skipped");
                    StepOutcome::Skipped(err)
                }
                Err(err) => return Err(err),
            };
            report.steps.push(StepReport { step, outcome });
        }
        tracing::info!(executed = report.executed(), total = report.steps.len(), "routine finished");
        Ok(report)
    }

    /// Append an observer. Observers are notified in registration order.
    pub fn add_observer(&mut self, observer: impl Observer + 'static) {
        self.observers.subscribe(Box::new(observer));
    }

    #[must_use]
    pub fn observers(&self) -> &ObserverBus {
        &self.observers
    }

    /// Fan `event` out to every observer; returns the number of failures.
    pub fn notify(&self, event: &Event) -> usize {
        self.observers.notify(event)
    }
}

impl std::fmt::Debug for Hub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hub")
            .field("info", &self.info)
            .field("devices", &self.order)
            .field("routines", &self.routines.keys().collect::<Vec<_>>())
            .field("observers", &self.observers)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::ManualClock;
    use chrono::TimeDelta;
    use smarthub_domain::device::{Color, DeviceKind};
    use smarthub_domain::event::{EventPayload, EventType};
    use smarthub_domain::time::now;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorder {
        events: Arc<Mutex<Vec<Event>>>,
    }

    impl Recorder {
        fn events(&self) -> Vec<Event> {
            self.events.lock().unwrap().clone()
        }

        fn count(&self, kind: EventType) -> usize {
            self.events().iter().filter(|e| e.event_type() == kind).count()
        }
    }

    impl Observer for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn notify(&self, event: &Event) -> Result<(), SmartHubError> {
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    struct Broken;

    impl Observer for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn notify(&self, _event: &Event) -> Result<(), SmartHubError> {
            Err(SmartHubError::Storage("read-only file system".into()))
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        saved: Mutex<Option<Snapshot>>,
    }

    impl ConfigStore for MemoryStore {
        fn load(&self) -> Result<Option<Snapshot>, SmartHubError> {
            Ok(self.saved.lock().unwrap().clone())
        }

        fn save(&self, snapshot: &Snapshot) -> Result<(), SmartHubError> {
            *self.saved.lock().unwrap() = Some(snapshot.clone());
            Ok(())
        }
    }

    fn hub_with(kinds: &[(DeviceKind, &str)]) -> (Hub, Recorder, ManualClock) {
        let clock = ManualClock::new(now());
        let mut hub = Hub::new(clock.clone());
        for (kind, id) in kinds {
            let device = hub.registry().create(*kind, *id, *id).unwrap();
            hub.add_device(device).unwrap();
        }
        let recorder = Recorder::default();
        hub.add_observer(recorder.clone());
        (hub, recorder, clock)
    }

    fn run(hub: &mut Hub, id: &str, trigger: &str) -> Result<CommandOutcome, SmartHubError> {
        hub.execute_command(&DeviceId::from(id), trigger, &serde_json::Value::Null)
    }

    #[test]
    fn should_emit_device_added_when_adding() {
        let (mut hub, recorder, _) = hub_with(&[]);
        let lamp = hub.registry().create(DeviceKind::Light, "lamp", "Lamp").unwrap();

        hub.add_device(lamp).unwrap();

        let events = recorder.events();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].payload,
            EventPayload::DeviceAdded {
                kind: DeviceKind::Light
            }
        );
    }

    #[test]
    fn should_reject_duplicate_id_and_keep_existing_device() {
        let (mut hub, recorder, _) = hub_with(&[(DeviceKind::Light, "x")]);
        let door = hub.registry().create(DeviceKind::Door, "x", "Door").unwrap();

        let err = hub.add_device(door).unwrap_err();

        assert!(matches!(err, SmartHubError::DuplicateId(ref id) if id.as_str() == "x"));
        assert_eq!(hub.device_count(), 1);
        assert_eq!(hub.get_device(&DeviceId::from("x")).unwrap().kind(), DeviceKind::Light);
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn should_remove_device_and_emit_event() {
        let (mut hub, recorder, _) = hub_with(&[(DeviceKind::Tv, "tv"), (DeviceKind::Alarm, "alarm")]);

        let removed = hub.remove_device(&DeviceId::from("tv")).unwrap();

        assert_eq!(removed.kind(), DeviceKind::Tv);
        assert_eq!(hub.device_count(), 1);
        assert_eq!(recorder.count(EventType::DeviceRemoved), 1);
        assert!(matches!(
            hub.remove_device(&DeviceId::from("tv")),
            Err(SmartHubError::DeviceNotFound(_))
        ));
    }

    #[test]
    fn should_list_devices_in_insertion_order() {
        let (hub, _, _) = hub_with(&[
            (DeviceKind::Tv, "zeta"),
            (DeviceKind::Door, "alpha"),
            (DeviceKind::Outlet, "mid"),
        ]);
        let ids: Vec<_> = hub.list_devices().iter().map(|d| d.id().to_string()).collect();
        assert_eq!(ids, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn should_emit_one_event_when_state_changes() {
        let (mut hub, recorder, _) = hub_with(&[(DeviceKind::Light, "lamp")]);

        let outcome = run(&mut hub, "lamp", "turn_on").unwrap();

        assert_eq!(
            outcome,
            CommandOutcome::StateChanged {
                before: "off",
                after: "on"
            }
        );
        let events = recorder.events();
        assert_eq!(events.len(), 1);
        let record = events[0].to_log_record().unwrap();
        assert_eq!(record.state_before, "off");
        assert_eq!(record.state_after, "on");
    }

    #[test]
    fn should_fail_without_event_when_trigger_is_unknown_for_kind() {
        let (mut hub, recorder, _) = hub_with(&[(DeviceKind::Door, "door")]);

        let err = run(&mut hub, "door", "turn_on").unwrap_err();

        assert!(matches!(
            err,
            SmartHubError::InvalidCommand(InvalidCommandError::UnknownTrigger { .. })
        ));
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn should_fail_when_trigger_is_not_valid_from_current_state() {
        let (mut hub, _, _) = hub_with(&[(DeviceKind::Door, "door")]);
        let err = run(&mut hub, "door", "open").unwrap_err();
        assert!(matches!(
            err,
            SmartHubError::InvalidCommand(InvalidCommandError::NotAllowed { state: "locked", .. })
        ));
    }

    #[test]
    fn should_fail_when_device_is_missing() {
        let (mut hub, _, _) = hub_with(&[]);
        assert!(matches!(
            run(&mut hub, "ghost", "turn_on"),
            Err(SmartHubError::DeviceNotFound(_))
        ));
    }

    #[test]
    fn should_count_blocked_lock_when_door_is_open() {
        let (mut hub, recorder, _) = hub_with(&[(DeviceKind::Door, "door")]);

        run(&mut hub, "door", "unlock").unwrap();
        run(&mut hub, "door", "open").unwrap();
        let blocked = run(&mut hub, "door", "lock").unwrap();
        run(&mut hub, "door", "close").unwrap();
        run(&mut hub, "door", "lock").unwrap();

        assert_eq!(blocked, CommandOutcome::GuardBlocked { state: "open" });
        let door = hub.get_device(&DeviceId::from("door")).unwrap();
        assert_eq!(door.state(), "locked");
        assert_eq!(door.as_door().unwrap().invalid_attempts(), 1);
        assert_eq!(recorder.count(EventType::CommandExecuted), 4);
    }

    #[test]
    fn should_report_attribute_change_without_event() {
        let (mut hub, recorder, _) = hub_with(&[(DeviceKind::Light, "lamp")]);
        run(&mut hub, "lamp", "turn_on").unwrap();

        let outcome = hub
            .execute_command(
                &DeviceId::from("lamp"),
                "set_color",
                &serde_json::json!({"color": "warm"}),
            )
            .unwrap();

        assert_eq!(outcome, CommandOutcome::AttributeChanged { state: "on" });
        let lamp = hub.get_device(&DeviceId::from("lamp")).unwrap();
        assert_eq!(lamp.as_light().unwrap().color(), Color::Warm);
        assert_eq!(recorder.events().len(), 1);
    }

    #[test]
    fn should_keep_brightness_when_argument_is_out_of_range() {
        let (mut hub, _, _) = hub_with(&[(DeviceKind::Light, "lamp")]);
        run(&mut hub, "lamp", "turn_on").unwrap();

        let err = hub
            .execute_command(
                &DeviceId::from("lamp"),
                "set_brightness",
                &serde_json::json!({"brightness": 150}),
            )
            .unwrap_err();

        assert!(matches!(err, SmartHubError::InvalidAttribute(_)));
        let lamp = hub.get_device(&DeviceId::from("lamp")).unwrap();
        assert_eq!(lamp.as_light().unwrap().brightness(), 50);
    }

    #[test]
    fn should_set_attribute_without_event() {
        let (mut hub, recorder, _) = hub_with(&[(DeviceKind::Outlet, "plug")]);

        hub.set_attribute(&DeviceId::from("plug"), Attribute::Wattage(60))
            .unwrap();

        let plug = hub.get_device(&DeviceId::from("plug")).unwrap();
        assert_eq!(plug.meter().unwrap().wattage(), 60);
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn should_accumulate_energy_using_hub_clock() {
        let (mut hub, _, clock) = hub_with(&[(DeviceKind::Outlet, "plug")]);

        run(&mut hub, "plug", "turn_on").unwrap();
        clock.advance(TimeDelta::seconds(3600));
        run(&mut hub, "plug", "turn_off").unwrap();

        let meter = hub.get_device(&DeviceId::from("plug")).unwrap().meter().unwrap();
        assert!((meter.consumption_wh() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn should_skip_failing_step_and_run_the_rest() {
        let (mut hub, recorder, _) = hub_with(&[(DeviceKind::Light, "lamp"), (DeviceKind::Tv, "tv")]);
        hub.add_routine(Routine::new(
            "evening",
            vec![
                RoutineStep::new("lamp", "turn_on"),
                RoutineStep::new("ghost", "turn_on"),
                RoutineStep::new("tv", "turn_on"),
            ],
        ));

        let report = hub.execute_routine("evening").unwrap();

        assert_eq!(report.executed(), 2);
        let skipped: Vec<_> = report.skipped().collect();
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].step.device_id.as_str(), "ghost");
        assert_eq!(recorder.count(EventType::CommandExecuted), 2);
    }

    #[test]
    fn should_skip_step_with_invalid_command() {
        let (mut hub, _, _) = hub_with(&[(DeviceKind::Door, "door")]);
        hub.add_routine(Routine::new(
            "leave",
            vec![RoutineStep::new("door", "open"), RoutineStep::new("door", "unlock")],
        ));

        let report = hub.execute_routine("leave").unwrap();

        assert_eq!(report.executed(), 1);
        assert_eq!(hub.get_device(&DeviceId::from("door")).unwrap().state(), "unlocked");
    }

    #[test]
    fn should_fail_when_routine_is_missing() {
        let (mut hub, _, _) = hub_with(&[]);
        assert!(matches!(
            hub.execute_routine("nope"),
            Err(SmartHubError::RoutineNotFound(_))
        ));
    }

    #[test]
    fn should_list_routines_sorted() {
        let (mut hub, _, _) = hub_with(&[]);
        hub.add_routine(Routine::new("wake", Vec::new()));
        hub.add_routine(Routine::new("away", Vec::new()));
        assert_eq!(hub.list_routines(), vec!["away", "wake"]);
    }

    #[test]
    fn should_complete_command_when_observer_fails() {
        let (mut hub, recorder, _) = hub_with(&[(DeviceKind::Alarm, "alarm")]);
        hub.add_observer(Broken);

        assert!(run(&mut hub, "alarm", "arm").is_ok());
        assert_eq!(recorder.events().len(), 1);
        assert_eq!(hub.observers().len(), 2);
    }

    #[test]
    fn should_round_trip_through_config_store() {
        let (mut hub, _, clock) = hub_with(&[(DeviceKind::Door, "door"), (DeviceKind::Light, "lamp")]);
        run(&mut hub, "door", "unlock").unwrap();
        hub.add_routine(Routine::new("night", vec![RoutineStep::new("door", "lock")]));
        let store = MemoryStore::default();

        hub.save(&store).unwrap();
        let loaded = Hub::load(&store, clock).unwrap();

        let ids: Vec<_> = loaded.list_devices().iter().map(|d| d.id().to_string()).collect();
        assert_eq!(ids, vec!["door", "lamp"]);
        assert_eq!(loaded.get_device(&DeviceId::from("door")).unwrap().state(), "unlocked");
        assert_eq!(loaded.list_routines(), vec!["night"]);
    }

    #[test]
    fn should_start_empty_when_store_has_nothing() {
        let store = MemoryStore::default();
        let hub = Hub::load(&store, ManualClock::new(now())).unwrap();
        assert_eq!(hub.device_count(), 0);
        assert!(hub.list_routines().is_empty());
    }

    #[test]
    fn should_not_emit_events_when_loading_configuration() {
        let (hub, _, clock) = hub_with(&[(DeviceKind::Tv, "tv")]);
        let mut loaded = Hub::from_snapshot(hub.snapshot(), clock).unwrap();
        let recorder = Recorder::default();
        loaded.add_observer(recorder.clone());
        assert_eq!(loaded.device_count(), 1);
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn should_meter_from_load_time_when_record_has_no_start() {
        let json = r#"{"devices": [
            {"id": "plug", "kind": "OUTLET", "name": "Plug", "state": "on",
             "attributes": {"wattage": 100, "consumption_wh": 10.0}}
        ]}"#;
        let clock = ManualClock::new(now());
        let mut hub = Hub::from_snapshot(Snapshot::from_json(json).unwrap(), clock.clone()).unwrap();

        clock.advance(TimeDelta::minutes(30));
        run(&mut hub, "plug", "turn_off").unwrap();

        let meter = hub.get_device(&DeviceId::from("plug")).unwrap().meter().unwrap();
        assert!((meter.consumption_wh() - 60.0).abs() < 1e-9);
    }
}
