//! One refresh cycle: fetch, reduce, join.

use tracing::debug;

use farmwatch_types::DeviceSnapshot;

use crate::error::Result;
use crate::reducer::latest_by_device;
use crate::traits::TelemetrySource;
use crate::view_model::build_snapshots;

/// Outcome of a successful refresh cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleOutput {
    pub snapshots: Vec<DeviceSnapshot>,
    /// Reading records excluded by the reducer.
    pub skipped: usize,
}

/// Fetch readings, intervals and relays concurrently, then build snapshots.
///
/// If any of the three fetches fails the whole cycle fails; there is no
/// partial result.
pub async fn run_cycle<S: TelemetrySource + ?Sized>(source: &S) -> Result<CycleOutput> {
    let (records, intervals, relays) = tokio::try_join!(
        source.fetch_readings(),
        source.fetch_intervals(),
        source.fetch_relays(),
    )?;

    let latest = latest_by_device(&records);
    let snapshots = build_snapshots(&latest, &intervals, &relays);
    debug!(
        records = records.len(),
        devices = snapshots.len(),
        skipped = latest.skipped(),
        "Refresh cycle complete"
    );

    Ok(CycleOutput {
        snapshots,
        skipped: latest.skipped(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockStore;
    use farmwatch_types::ReadingRecord;

    #[tokio::test]
    async fn test_cycle_builds_snapshots() {
        let store = MockStore::builder()
            .reading(ReadingRecord::new("sensor-001", "2024-05-01T10:00:00Z").with_temperature(21.5))
            .reading(ReadingRecord::new("sensor-001", "2024-05-01T10:05:00Z").with_temperature(22.0))
            .reading(ReadingRecord::new("sensor-002", "not a time"))
            .interval("sensor-001", 1800)
            .relay("sensor-001", "10.0.0.5")
            .build();

        let output = run_cycle(&store).await.unwrap();
        assert_eq!(output.snapshots.len(), 1);
        assert_eq!(output.skipped, 1);
        let snap = &output.snapshots[0];
        assert_eq!(snap.reading.temperature, Some(22.0));
        assert_eq!(snap.interval_seconds, 1800);
        assert!(snap.relay_available);
    }

    #[tokio::test]
    async fn test_any_failed_fetch_fails_the_cycle() {
        let store = MockStore::builder()
            .reading(ReadingRecord::new("a", "2024-05-01T10:00:00Z"))
            .build();
        // Only one of the three fetches fails
        store.fail_next(1);
        assert!(run_cycle(&store).await.is_err());
        assert!(run_cycle(&store).await.is_ok());
    }

    #[tokio::test]
    async fn test_empty_store() {
        let output = run_cycle(&MockStore::new()).await.unwrap();
        assert!(output.snapshots.is_empty());
        assert_eq!(output.skipped, 0);
    }
}
