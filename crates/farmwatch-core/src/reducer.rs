//! Latest-state reduction: one current reading per device.
//!
//! The store hands back every reading it has, unordered and with any number
//! of entries per device. [`latest_by_device`] folds that set in a single
//! pass into the freshest valid reading for each device.
//!
//! Freshness is decided on parsed timestamps. A record replaces the held
//! reading only when its timestamp is strictly greater, so when two records
//! for a device share a timestamp the one that came first in fetched order
//! is kept.

use std::collections::BTreeMap;

use tracing::warn;

use farmwatch_types::{Reading, ReadingRecord};

/// Result of reducing a reading set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LatestReadings {
    by_device: BTreeMap<String, Reading>,
    skipped: usize,
}

impl LatestReadings {
    /// Latest reading for a device, if it has any valid one.
    pub fn get(&self, device_id: &str) -> Option<&Reading> {
        self.by_device.get(device_id)
    }

    /// Number of devices with at least one valid reading.
    pub fn len(&self) -> usize {
        self.by_device.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_device.is_empty()
    }

    /// Records excluded for data-quality reasons.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Latest readings ordered by device id.
    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.by_device.values()
    }

    /// Device ids ordered.
    pub fn device_ids(&self) -> impl Iterator<Item = &str> {
        self.by_device.keys().map(String::as_str)
    }

    pub fn into_inner(self) -> BTreeMap<String, Reading> {
        self.by_device
    }
}

/// Fold raw records into the latest valid reading per device.
///
/// Records with a missing device id or an unparsable timestamp are skipped
/// and logged; they never fail the reduction.
pub fn latest_by_device(records: &[ReadingRecord]) -> LatestReadings {
    let mut latest = LatestReadings::default();

    for record in records {
        let reading = match Reading::try_from(record) {
            Ok(reading) => reading,
            Err(e) => {
                warn!(
                    device_id = record.device_id.as_deref().unwrap_or("<missing>"),
                    "Skipping reading: {}", e
                );
                latest.skipped += 1;
                continue;
            }
        };

        match latest.by_device.get(&reading.device_id) {
            Some(held) if reading.timestamp <= held.timestamp => {}
            _ => {
                latest.by_device.insert(reading.device_id.clone(), reading);
            }
        }
    }

    latest
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use time::macros::datetime;

    fn record(device: &str, ts: &str, temp: f64) -> ReadingRecord {
        ReadingRecord::new(device, ts).with_temperature(temp)
    }

    #[test]
    fn test_empty_input() {
        let latest = latest_by_device(&[]);
        assert!(latest.is_empty());
        assert_eq!(latest.skipped(), 0);
    }

    #[test]
    fn test_keeps_newest_regardless_of_order() {
        let records = vec![
            record("sensor-001", "2024-05-01T10:05:00Z", 22.0),
            record("sensor-001", "2024-05-01T10:00:00Z", 21.5),
            record("sensor-002", "2024-05-01T09:00:00Z", 18.0),
            record("sensor-001", "2024-05-01T09:55:00Z", 21.0),
        ];
        let latest = latest_by_device(&records);

        assert_eq!(latest.len(), 2);
        let s1 = latest.get("sensor-001").unwrap();
        assert_eq!(s1.temperature, Some(22.0));
        assert_eq!(s1.timestamp, datetime!(2024-05-01 10:05:00 UTC));
        assert_eq!(latest.get("sensor-002").unwrap().temperature, Some(18.0));
    }

    #[test]
    fn test_compares_instants_not_text() {
        // 10:00+07:00 is 03:00 UTC, older than 04:00Z despite sorting later as text.
        let records = vec![
            record("a", "2024-05-01T04:00:00Z", 1.0),
            record("a", "2024-05-01T10:00:00+07:00", 2.0),
        ];
        let latest = latest_by_device(&records);
        assert_eq!(latest.get("a").unwrap().temperature, Some(1.0));
    }

    #[test]
    fn test_equal_timestamps_first_wins() {
        let records = vec![
            record("a", "2024-05-01T10:00:00Z", 1.0),
            record("a", "2024-05-01T10:00:00Z", 2.0),
        ];
        let latest = latest_by_device(&records);
        assert_eq!(latest.get("a").unwrap().temperature, Some(1.0));
    }

    #[test]
    fn test_skips_malformed_records() {
        let records = vec![
            record("a", "2024-05-01T10:00:00Z", 1.0),
            record("a", "garbage", 99.0),
            ReadingRecord {
                timestamp: Some("2024-05-01T11:00:00Z".into()),
                temperature: Some(50.0),
                ..Default::default()
            },
            record("b", "", 3.0),
        ];
        let latest = latest_by_device(&records);
        assert_eq!(latest.len(), 1);
        assert_eq!(latest.skipped(), 3);
        assert_eq!(latest.get("a").unwrap().temperature, Some(1.0));
        assert!(latest.get("b").is_none());
    }

    /// Log sink shared between a test and its subscriber.
    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_skipped_records_are_logged_as_warnings() {
        let logs = CapturedLogs::default();
        let sink = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();

        let records = vec![
            record("sensor-001", "2024-05-01T10:00:00Z", 1.0),
            record("sensor-003", "yesterday", 2.0),
        ];
        let latest = tracing::subscriber::with_default(subscriber, || latest_by_device(&records));
        assert_eq!(latest.skipped(), 1);

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert_eq!(output.lines().count(), 1);
        assert!(output.contains("WARN"));
        assert!(output.contains("Skipping reading"));
        assert!(output.contains("sensor-003"));
        assert!(output.contains("yesterday"));
    }

    #[test]
    fn test_does_not_mutate_input() {
        let records = vec![
            record("a", "2024-05-01T10:00:00Z", 1.0),
            record("a", "2024-05-01T11:00:00Z", 2.0),
        ];
        let before = records.clone();
        let _ = latest_by_device(&records);
        assert_eq!(records, before);
    }

    fn arb_records() -> impl Strategy<Value = Vec<ReadingRecord>> {
        let device = prop::sample::select(vec!["a", "b", "c", "d", "e"]);
        // Seconds within one day, so equal timestamps show up regularly.
        let secs = 0i64..86_400;
        prop::collection::vec((device, secs, -20.0f64..50.0), 0..60).prop_map(|rows| {
            rows.into_iter()
                .map(|(d, s, t)| {
                    let ts = datetime!(2024-05-01 00:00:00 UTC) + time::Duration::seconds(s);
                    let text = ts
                        .format(&time::format_description::well_known::Rfc3339)
                        .unwrap();
                    ReadingRecord::new(d, text).with_temperature(t)
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_one_entry_per_device_with_max_timestamp(records in arb_records()) {
            let latest = latest_by_device(&records);

            let mut devices: Vec<&str> = records
                .iter()
                .filter_map(|r| r.device_id.as_deref())
                .collect();
            devices.sort_unstable();
            devices.dedup();
            prop_assert_eq!(latest.len(), devices.len());

            for device in devices {
                let max = records
                    .iter()
                    .filter(|r| r.device_id.as_deref() == Some(device))
                    .map(|r| Reading::try_from(r).unwrap().timestamp)
                    .max()
                    .unwrap();
                prop_assert_eq!(latest.get(device).unwrap().timestamp, max);
            }
        }

        #[test]
        fn prop_reduction_is_idempotent(records in arb_records()) {
            prop_assert_eq!(latest_by_device(&records), latest_by_device(&records));
        }
    }
}
