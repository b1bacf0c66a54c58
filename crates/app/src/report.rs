//! Report engine: aggregations over the durable log and live devices.
//!
//! Every function here is pure: it reads its inputs and returns a fresh
//! result, so running a report twice yields the same answer.

use std::collections::{BTreeMap, HashMap};

use chrono::TimeDelta;
use smarthub_domain::device::{Device, DeviceKind};
use smarthub_domain::event::LogRecord;
use smarthub_domain::id::DeviceId;
use smarthub_domain::time::{Timestamp, hours_between};

const TURN_ON: &str = "turn_on";
const TURN_OFF: &str = "turn_off";

/// Completed on→off intervals of one device, replayed in timestamp order.
///
/// An "on" without a later "off" contributes nothing.
fn on_intervals(records: &[LogRecord], id: &DeviceId) -> Vec<(Timestamp, Timestamp)> {
    let mut own: Vec<&LogRecord> = records.iter().filter(|r| &r.device_id == id).collect();
    own.sort_by_key(|r| r.timestamp);

    let mut intervals = Vec::new();
    let mut on_since = None;
    for record in own {
        match record.command.as_str() {
            TURN_ON if on_since.is_none() => on_since = Some(record.timestamp),
            TURN_OFF => {
                if let Some(start) = on_since.take() {
                    intervals.push((start, record.timestamp));
                }
            }
            _ => {}
        }
    }
    intervals
}

/// Total time each light spent on. Every live light appears, with zero when
/// the log has nothing for it.
#[must_use]
pub fn light_on_time(records: &[LogRecord], devices: &[&Device]) -> Vec<(DeviceId, TimeDelta)> {
    devices
        .iter()
        .filter(|d| d.kind() == DeviceKind::Light)
        .map(|light| {
            let total = on_intervals(records, light.id())
                .into_iter()
                .fold(TimeDelta::zero(), |acc, (start, end)| acc + (end - start));
            (light.id().clone(), total)
        })
        .collect()
}

/// Energy each outlet drew while on, in watt-hours, using its current
/// rated wattage.
#[must_use]
pub fn outlet_energy(records: &[LogRecord], devices: &[&Device]) -> Vec<(DeviceId, f64)> {
    devices
        .iter()
        .filter(|d| d.kind() == DeviceKind::Outlet)
        .filter_map(|outlet| Some((outlet, outlet.meter()?)))
        .map(|(outlet, meter)| {
            let hours: f64 = on_intervals(records, outlet.id())
                .into_iter()
                .map(|(start, end)| hours_between(start, end))
                .sum();
            (outlet.id().clone(), f64::from(meter.wattage()) * hours)
        })
        .collect()
}

/// Number of logged commands per device, most used first. Ties keep the
/// order in which devices first appear in the log.
#[must_use]
pub fn usage_ranking(records: &[LogRecord]) -> Vec<(DeviceId, usize)> {
    let mut ranking: Vec<(DeviceId, usize)> = Vec::new();
    let mut index: HashMap<&DeviceId, usize> = HashMap::new();
    for record in records {
        match index.get(&record.device_id) {
            Some(&pos) => ranking[pos].1 += 1,
            None => {
                index.insert(&record.device_id, ranking.len());
                ranking.push((record.device_id.clone(), 1));
            }
        }
    }
    ranking.sort_by(|a, b| b.1.cmp(&a.1));
    ranking
}

/// Command counts grouped by the current kind of each record's device.
///
/// Records of devices that no longer exist are grouped under `None`.
#[must_use]
pub fn command_distribution(
    records: &[LogRecord],
    devices: &[&Device],
) -> BTreeMap<Option<DeviceKind>, BTreeMap<String, usize>> {
    let kinds: HashMap<&DeviceId, DeviceKind> =
        devices.iter().map(|d| (d.id(), d.kind())).collect();

    let mut distribution: BTreeMap<Option<DeviceKind>, BTreeMap<String, usize>> = BTreeMap::new();
    for record in records {
        let kind = kinds.get(&record.device_id).copied();
        *distribution
            .entry(kind)
            .or_default()
            .entry(record.command.clone())
            .or_default() += 1;
    }
    distribution
}

/// Blocked lock attempts per door; doors without any are left out.
#[must_use]
pub fn invalid_lock_attempts(devices: &[&Device]) -> Vec<(DeviceId, u32)> {
    devices
        .iter()
        .filter_map(|d| Some((d.id(), d.as_door()?.invalid_attempts())))
        .filter(|(_, attempts)| *attempts > 0)
        .map(|(id, attempts)| (id.clone(), attempts))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use smarthub_domain::device::DeviceRegistry;
    use smarthub_domain::time::now;

    fn record(at: Timestamp, id: &str, command: &str, before: &str, after: &str) -> LogRecord {
        LogRecord {
            timestamp: at,
            device_id: DeviceId::from(id),
            command: command.to_string(),
            state_before: before.to_string(),
            state_after: after.to_string(),
        }
    }

    fn device(kind: DeviceKind, id: &str) -> Device {
        DeviceRegistry::default().create(kind, id, id).unwrap()
    }

    #[test]
    fn should_sum_completed_on_intervals_for_lights() {
        let t0 = now();
        let lamp = device(DeviceKind::Light, "lamp");
        let records = vec![
            record(t0, "lamp", "turn_on", "off", "on"),
            record(t0 + TimeDelta::minutes(10), "lamp", "turn_off", "on", "off"),
            record(t0 + TimeDelta::minutes(20), "lamp", "turn_on", "off", "on"),
            record(t0 + TimeDelta::minutes(25), "lamp", "turn_off", "on", "off"),
        ];

        let report = light_on_time(&records, &[&lamp]);

        assert_eq!(report, vec![(DeviceId::from("lamp"), TimeDelta::minutes(15))]);
    }

    #[test]
    fn should_sort_records_before_pairing() {
        let t0 = now();
        let lamp = device(DeviceKind::Light, "lamp");
        let records = vec![
            record(t0 + TimeDelta::minutes(5), "lamp", "turn_off", "on", "off"),
            record(t0, "lamp", "turn_on", "off", "on"),
        ];

        let report = light_on_time(&records, &[&lamp]);

        assert_eq!(report[0].1, TimeDelta::minutes(5));
    }

    #[test]
    fn should_count_zero_for_unterminated_on_and_silent_lights() {
        let t0 = now();
        let lamp = device(DeviceKind::Light, "lamp");
        let quiet = device(DeviceKind::Light, "quiet");
        let records = vec![record(t0, "lamp", "turn_on", "off", "on")];

        let report = light_on_time(&records, &[&lamp, &quiet]);

        assert_eq!(report.len(), 2);
        assert!(report.iter().all(|(_, t)| *t == TimeDelta::zero()));
    }

    #[test]
    fn should_compute_outlet_energy_from_wattage_and_hours() {
        let t0 = now();
        let plug = device(DeviceKind::Outlet, "plug");
        let records = vec![
            record(t0, "plug", "turn_on", "off", "on"),
            record(t0 + TimeDelta::seconds(3600), "plug", "turn_off", "on", "off"),
        ];

        let report = outlet_energy(&records, &[&plug]);

        assert_eq!(report.len(), 1);
        assert!((report[0].1 - 100.0).abs() < 1e-9);
    }

    #[test]
    fn should_rank_devices_by_usage_with_stable_ties() {
        let t0 = now();
        let records = vec![
            record(t0, "b", "turn_on", "off", "on"),
            record(t0, "a", "turn_on", "off", "on"),
            record(t0, "c", "arm", "off", "on"),
            record(t0, "c", "trip", "on", "triggered"),
        ];

        let ranking = usage_ranking(&records);

        let ids: Vec<_> = ranking.iter().map(|(id, n)| (id.as_str(), *n)).collect();
        assert_eq!(ids, vec![("c", 2), ("b", 1), ("a", 1)]);
    }

    #[test]
    fn should_group_commands_by_current_kind() {
        let t0 = now();
        let door = device(DeviceKind::Door, "door");
        let records = vec![
            record(t0, "door", "unlock", "locked", "unlocked"),
            record(t0, "door", "open", "unlocked", "open"),
            record(t0, "door", "close", "open", "unlocked"),
            record(t0, "door", "open", "unlocked", "open"),
            record(t0, "gone", "turn_on", "off", "on"),
        ];

        let distribution = command_distribution(&records, &[&door]);

        let doors = &distribution[&Some(DeviceKind::Door)];
        assert_eq!(doors["open"], 2);
        assert_eq!(doors["unlock"], 1);
        assert_eq!(distribution[&None::<DeviceKind>]["turn_on"], 1);
    }

    #[test]
    fn should_list_only_doors_with_blocked_attempts() {
        let mut busy = device(DeviceKind::Door, "busy");
        let idle = device(DeviceKind::Door, "idle");
        let at = now();
        let null = serde_json::Value::Null;
        busy.fire("unlock", &null, at).unwrap();
        busy.fire("open", &null, at).unwrap();
        busy.fire("lock", &null, at).unwrap();

        let report = invalid_lock_attempts(&[&busy, &idle]);

        assert_eq!(report, vec![(DeviceId::from("busy"), 1)]);
    }

    #[test]
    fn should_return_identical_results_when_run_twice() {
        let t0 = now();
        let lamp = device(DeviceKind::Light, "lamp");
        let records = vec![
            record(t0, "lamp", "turn_on", "off", "on"),
            record(t0 + TimeDelta::minutes(3), "lamp", "turn_off", "on", "off"),
        ];
        let devices = [&lamp];

        assert_eq!(light_on_time(&records, &devices), light_on_time(&records, &devices));
        assert_eq!(usage_ranking(&records), usage_ranking(&records));
        assert_eq!(
            command_distribution(&records, &devices),
            command_distribution(&records, &devices)
        );
    }
}
