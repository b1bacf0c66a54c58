//! Numbered console menu driving a [`Hub`].
//!
//! The menu is generic over its input and output so it can be scripted in
//! tests. Hub errors are printed and the loop continues; only I/O failures
//! on the terminal itself (or the final save) end the session with an error.

use std::io::{self, BufRead, Write};

use anyhow::Context;
use chrono::TimeDelta;
use smarthub_app::Hub;
use smarthub_app::hub::{CommandOutcome, RoutineReport, StepOutcome};
use smarthub_app::ports::{ConfigStore, EventLog};
use smarthub_app::report;
use smarthub_domain::device::{Attribute, Color, Device, DeviceKind};
use smarthub_domain::id::DeviceId;

const MAIN_MENU: &str = "\
 1) List devices
 2) Show device
 3) Execute command
 4) Change attribute
 5) Run routine
 6) Reports
 7) Save configuration
 8) Add device
 9) Remove device
10) Exit";

const REPORT_MENU: &str = "\
 1) Light on-time
 2) Outlet energy
 3) Most used devices
 4) Commands by device kind
 5) Invalid lock attempts";

enum Flow {
    Continue,
    Exit,
}

pub struct Menu<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.output
    }

    /// Run until the user exits or input ends, then save the configuration.
    ///
    /// # Errors
    ///
    /// Fails on terminal I/O errors or when the final save fails.
    pub fn run(
        &mut self,
        hub: &mut Hub,
        log: &impl EventLog,
        store: &impl ConfigStore,
    ) -> anyhow::Result<()> {
        writeln!(self.output, "== {} v{} ==", hub.info().name, hub.info().version)?;
        loop {
            writeln!(self.output, "\n{MAIN_MENU}")?;
            let Some(choice) = self.prompt("Choose an option")? else {
                break;
            };
            let flow = match choice.as_str() {
                "1" => self.list_devices(hub)?,
                "2" => self.show_device(hub)?,
                "3" => self.execute_command(hub)?,
                "4" => self.change_attribute(hub)?,
                "5" => self.run_routine(hub)?,
                "6" => self.reports(hub, log)?,
                "7" => {
                    match hub.save(store) {
                        Ok(()) => writeln!(self.output, "Configuration saved.")?,
                        Err(err) => writeln!(self.output, "error: {err}")?,
                    }
                    Flow::Continue
                }
                "8" => self.add_device(hub)?,
                "9" => self.remove_device(hub)?,
                "10" => Flow::Exit,
                other => {
                    writeln!(self.output, "Unknown option {other:?}.")?;
                    Flow::Continue
                }
            };
            if matches!(flow, Flow::Exit) {
                break;
            }
        }
        hub.save(store).context("failed to save configuration on exit")?;
        writeln!(self.output, "Configuration saved. Bye.")?;
        Ok(())
    }

    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}: ")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn prompt_device<'h>(&mut self, hub: &'h Hub) -> io::Result<Option<Result<&'h Device, String>>> {
        let Some(id) = self.prompt("Device id")? else {
            return Ok(None);
        };
        Ok(Some(
            hub.get_device(&DeviceId::from(id))
                .map_err(|err| err.to_string()),
        ))
    }

    fn list_devices(&mut self, hub: &Hub) -> io::Result<Flow> {
        let devices = hub.list_devices();
        if devices.is_empty() {
            writeln!(self.output, "No devices.")?;
        }
        for device in devices {
            writeln!(self.output, "{device}")?;
        }
        Ok(Flow::Continue)
    }

    fn show_device(&mut self, hub: &Hub) -> io::Result<Flow> {
        let device = match self.prompt_device(hub)? {
            None => return Ok(Flow::Exit),
            Some(Err(err)) => {
                writeln!(self.output, "error: {err}")?;
                return Ok(Flow::Continue);
            }
            Some(Ok(device)) => device,
        };
        writeln!(self.output, "id:       {}", device.id())?;
        writeln!(self.output, "name:     {}", device.name)?;
        writeln!(self.output, "kind:     {}", device.kind())?;
        writeln!(self.output, "state:    {}", device.state())?;
        for (label, value) in attributes(device) {
            writeln!(self.output, "{label:<9} {value}")?;
        }
        writeln!(self.output, "commands: {}", device.available_triggers().join(", "))?;
        Ok(Flow::Continue)
    }

    fn execute_command(&mut self, hub: &mut Hub) -> io::Result<Flow> {
        let (id, triggers) = match self.prompt_device(hub)? {
            None => return Ok(Flow::Exit),
            Some(Err(err)) => {
                writeln!(self.output, "error: {err}")?;
                return Ok(Flow::Continue);
            }
            Some(Ok(device)) => (device.id().clone(), device.available_triggers()),
        };
        if triggers.is_empty() {
            writeln!(self.output, "No command available from the current state.")?;
            return Ok(Flow::Continue);
        }
        writeln!(self.output, "Available: {}", triggers.join(", "))?;
        let Some(trigger) = self.prompt("Command")? else {
            return Ok(Flow::Exit);
        };

        let args = match trigger.as_str() {
            "set_brightness" => {
                let Some(raw) = self.prompt("Brightness (0-100)")? else {
                    return Ok(Flow::Exit);
                };
                match raw.parse::<i64>() {
                    Ok(value) => serde_json::json!({ "brightness": value }),
                    Err(_) => {
                        writeln!(self.output, "error: {raw:?} is not a number")?;
                        return Ok(Flow::Continue);
                    }
                }
            }
            "set_color" => {
                let Some(raw) = self.prompt("Color (warm, cool, neutral)")? else {
                    return Ok(Flow::Exit);
                };
                serde_json::json!({ "color": raw })
            }
            _ => serde_json::Value::Null,
        };

        match hub.execute_command(&id, &trigger, &args) {
            Ok(outcome) => writeln!(self.output, "{}", describe_outcome(&id, outcome))?,
            Err(err) => writeln!(self.output, "error: {err}")?,
        }
        Ok(Flow::Continue)
    }

    fn change_attribute(&mut self, hub: &mut Hub) -> io::Result<Flow> {
        let id = match self.prompt_device(hub)? {
            None => return Ok(Flow::Exit),
            Some(Err(err)) => {
                writeln!(self.output, "error: {err}")?;
                return Ok(Flow::Continue);
            }
            Some(Ok(device)) => device.id().clone(),
        };
        let Some(name) = self.prompt("Attribute (brightness, color, wattage)")? else {
            return Ok(Flow::Exit);
        };
        let Some(raw) = self.prompt("Value")? else {
            return Ok(Flow::Exit);
        };
        let attribute = match parse_attribute(&name, &raw) {
            Ok(attribute) => attribute,
            Err(reason) => {
                writeln!(self.output, "error: {reason}")?;
                return Ok(Flow::Continue);
            }
        };
        match hub.set_attribute(&id, attribute) {
            Ok(()) => writeln!(self.output, "{id}: {name} set to {raw}")?,
            Err(err) => writeln!(self.output, "error: {err}")?,
        }
        Ok(Flow::Continue)
    }

    fn run_routine(&mut self, hub: &mut Hub) -> io::Result<Flow> {
        let names = hub.list_routines();
        if names.is_empty() {
            writeln!(self.output, "No routines.")?;
            return Ok(Flow::Continue);
        }
        writeln!(self.output, "Routines: {}", names.join(", "))?;
        let Some(name) = self.prompt("Routine")? else {
            return Ok(Flow::Exit);
        };
        match hub.execute_routine(&name) {
            Ok(report) => self.print_routine(&report)?,
            Err(err) => writeln!(self.output, "error: {err}")?,
        }
        Ok(Flow::Continue)
    }

    fn print_routine(&mut self, report: &RoutineReport) -> io::Result<()> {
        for entry in &report.steps {
            match &entry.outcome {
                StepOutcome::Executed(outcome) => writeln!(
                    self.output,
                    "  {}: {}",
                    entry.step,
                    describe_outcome(&entry.step.device_id, *outcome)
                )?,
                StepOutcome::Skipped(err) => {
                    writeln!(self.output, "  {}: skipped ({err})", entry.step)?;
                }
            }
        }
        writeln!(
            self.output,
            "Routine {}: {}/{} steps executed.",
            report.name,
            report.executed(),
            report.steps.len()
        )
    }

    fn reports(&mut self, hub: &Hub, log: &impl EventLog) -> io::Result<Flow> {
        writeln!(self.output, "{REPORT_MENU}")?;
        let Some(choice) = self.prompt("Report")? else {
            return Ok(Flow::Exit);
        };
        let records = match log.read_all() {
            Ok(records) => records,
            Err(err) => {
                writeln!(self.output, "error: {err}")?;
                return Ok(Flow::Continue);
            }
        };
        let devices = hub.list_devices();
        match choice.as_str() {
            "1" => {
                for (id, on_time) in report::light_on_time(&records, &devices) {
                    writeln!(self.output, "{id}: {}", format_duration(on_time))?;
                }
            }
            "2" => {
                for (id, wh) in report::outlet_energy(&records, &devices) {
                    writeln!(self.output, "{id}: {wh:.2} Wh")?;
                }
            }
            "3" => {
                for (rank, (id, count)) in report::usage_ranking(&records).into_iter().enumerate() {
                    writeln!(self.output, "{}. {id} ({count} commands)", rank + 1)?;
                }
            }
            "4" => {
                for (kind, commands) in report::command_distribution(&records, &devices) {
                    let label = kind.map_or("unknown", DeviceKind::as_str);
                    let counts: Vec<String> = commands
                        .iter()
                        .map(|(command, count)| format!("{command}={count}"))
                        .collect();
                    writeln!(self.output, "{label}: {}", counts.join(", "))?;
                }
            }
            "5" => {
                let attempts = report::invalid_lock_attempts(&devices);
                if attempts.is_empty() {
                    writeln!(self.output, "No invalid lock attempts.")?;
                }
                for (id, count) in attempts {
                    writeln!(self.output, "{id}: {count}")?;
                }
            }
            other => writeln!(self.output, "Unknown report {other:?}.")?,
        }
        Ok(Flow::Continue)
    }

    fn add_device(&mut self, hub: &mut Hub) -> io::Result<Flow> {
        let kinds: Vec<&str> = hub.registry().kinds().map(DeviceKind::as_str).collect();
        writeln!(self.output, "Kinds: {}", kinds.join(", "))?;
        let Some(raw_kind) = self.prompt("Kind")? else {
            return Ok(Flow::Exit);
        };
        let kind: DeviceKind = match raw_kind.parse() {
            Ok(kind) => kind,
            Err(err) => {
                writeln!(self.output, "error: {err}")?;
                return Ok(Flow::Continue);
            }
        };
        let Some(id) = self.prompt("Device id")? else {
            return Ok(Flow::Exit);
        };
        let id = DeviceId::from(id);
        if !id.is_valid() {
            writeln!(self.output, "error: device id must be non-empty and contain no whitespace")?;
            return Ok(Flow::Continue);
        }
        let Some(name) = self.prompt("Name")? else {
            return Ok(Flow::Exit);
        };
        let Some(device) = hub.registry().create(kind, id, name) else {
            writeln!(self.output, "error: kind {kind} is not registered")?;
            return Ok(Flow::Continue);
        };
        match hub.add_device(device) {
            Ok(()) => writeln!(self.output, "Device added.")?,
            Err(err) => writeln!(self.output, "error: {err}")?,
        }
        Ok(Flow::Continue)
    }

    fn remove_device(&mut self, hub: &mut Hub) -> io::Result<Flow> {
        let Some(id) = self.prompt("Device id")? else {
            return Ok(Flow::Exit);
        };
        match hub.remove_device(&DeviceId::from(id)) {
            Ok(device) => writeln!(self.output, "Removed {device}.")?,
            Err(err) => writeln!(self.output, "error: {err}")?,
        }
        Ok(Flow::Continue)
    }
}

fn attributes(device: &Device) -> Vec<(&'static str, String)> {
    let mut out = Vec::new();
    if let Some(door) = device.as_door() {
        out.push(("attempts:", door.invalid_attempts().to_string()));
    }
    if let Some(light) = device.as_light() {
        out.push(("bright:", format!("{}%", light.brightness())));
        out.push(("color:", light.color().to_string()));
    }
    if let Some(meter) = device.meter() {
        out.push(("wattage:", format!("{} W", meter.wattage())));
        out.push(("energy:", format!("{:.2} Wh", meter.consumption_wh())));
    }
    out
}

fn parse_attribute(name: &str, raw: &str) -> Result<Attribute, String> {
    let number = || {
        raw.parse::<i64>()
            .map_err(|_| format!("{raw:?} is not a number"))
    };
    match name.to_ascii_lowercase().as_str() {
        "brightness" => Ok(Attribute::Brightness(number()?)),
        "wattage" => Ok(Attribute::Wattage(number()?)),
        "color" => raw
            .parse::<Color>()
            .map(Attribute::Color)
            .map_err(|err| err.to_string()),
        other => Err(format!("unknown attribute {other:?}")),
    }
}

fn describe_outcome(id: &DeviceId, outcome: CommandOutcome) -> String {
    match outcome {
        CommandOutcome::StateChanged { before, after } => format!("{id}: {before} -> {after}"),
        CommandOutcome::AttributeChanged { state } => format!("{id}: attribute updated ({state})"),
        CommandOutcome::Unchanged { state } => format!("{id}: unchanged ({state})"),
        CommandOutcome::GuardBlocked { state } => {
            format!("{id}: command blocked, still {state}")
        }
    }
}

fn format_duration(delta: TimeDelta) -> String {
    let total = delta.num_seconds();
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}
