//! Device view model: latest readings joined with interval and relay config.
//!
//! [`build_snapshots`] is a pure function of its three inputs. The interval
//! and relay lookups it uses are local to each call.
//!
//! Only devices that have telemetry appear in the output. A device that has
//! an interval setting or a relay address but no valid reading has nothing
//! to display and is left out.

use std::collections::HashMap;

use farmwatch_types::{DEFAULT_INTERVAL_SECS, DeviceSnapshot, IntervalSetting, RelayAddress};

use crate::reducer::LatestReadings;

/// Build one snapshot per device in `latest`, ordered by device id.
///
/// When a device has several interval settings or relay addresses, the last
/// one in the given order is used.
pub fn build_snapshots(
    latest: &LatestReadings,
    intervals: &[IntervalSetting],
    relays: &[RelayAddress],
) -> Vec<DeviceSnapshot> {
    let interval_by_device: HashMap<&str, u32> = intervals
        .iter()
        .map(|s| (s.device_id.as_str(), s.interval_seconds))
        .collect();
    let relay_by_device: HashMap<&str, &str> = relays
        .iter()
        .map(|r| (r.device_id.as_str(), r.address.as_str()))
        .collect();

    latest
        .iter()
        .map(|reading| {
            let id = reading.device_id.as_str();
            DeviceSnapshot {
                device_id: reading.device_id.clone(),
                reading: reading.clone(),
                interval_seconds: interval_by_device
                    .get(id)
                    .copied()
                    .unwrap_or(DEFAULT_INTERVAL_SECS),
                relay_available: relay_by_device.contains_key(id),
            }
        })
        .collect()
}
