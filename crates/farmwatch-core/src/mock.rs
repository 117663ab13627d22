//! In-memory store and control plane for testing.
//!
//! [`MockStore`] implements both [`TelemetrySource`] and [`ControlPlane`], so
//! the refresh pipeline, scheduler, dispatcher and history builder can be
//! exercised without a backend.
//!
//! # Features
//!
//! - **Failure injection**: fail every fetch, or only the next `n` fetches
//! - **Latency simulation**: delay each fetch to model a slow network
//! - **Command capture**: accepted commands are recorded; rejections can be scripted
//! - **Concurrency tracking**: records how many reading fetches overlap

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use farmwatch_types::{ControlCommand, IntervalSetting, ReadingRecord, RelayAction, RelayAddress};

use crate::error::{Error, Result};
use crate::traits::{ControlPlane, TelemetrySource};

/// A mock reading store for testing.
///
/// # Example
///
/// ```
/// use farmwatch_core::{MockStore, TelemetrySource};
/// use farmwatch_types::ReadingRecord;
///
/// #[tokio::main]
/// async fn main() {
///     let store = MockStore::builder()
///         .reading(ReadingRecord::new("sensor-001", "2024-05-01T10:00:00Z"))
///         .build();
///     assert_eq!(store.fetch_readings().await.unwrap().len(), 1);
/// }
/// ```
#[derive(Default)]
pub struct MockStore {
    readings: RwLock<Vec<ReadingRecord>>,
    history: RwLock<HashMap<String, Vec<ReadingRecord>>>,
    intervals: RwLock<Vec<IntervalSetting>>,
    relays: RwLock<Vec<RelayAddress>>,
    commands: RwLock<Vec<ControlCommand>>,
    rejection: RwLock<Option<(u16, String)>>,
    should_fail: AtomicBool,
    remaining_failures: AtomicU32,
    /// Simulated fetch latency in milliseconds (0 = no delay).
    fetch_latency_ms: AtomicU64,
    fetch_count: AtomicU32,
    command_count: AtomicU32,
    in_flight: AtomicU32,
    max_in_flight: AtomicU32,
}

impl std::fmt::Debug for MockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockStore")
            .field("should_fail", &self.should_fail.load(Ordering::Relaxed))
            .field("fetch_count", &self.fetch_count.load(Ordering::Relaxed))
            .field("command_count", &self.command_count.load(Ordering::Relaxed))
            .finish()
    }
}

/// Decrements the in-flight counter even when the fetch future is dropped.
struct InFlight<'a>(&'a AtomicU32);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for a pre-populated store.
    pub fn builder() -> MockStoreBuilder {
        MockStoreBuilder::default()
    }

    async fn check_should_fail(&self) -> Result<()> {
        let latency = self.fetch_latency_ms.load(Ordering::Relaxed);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        // Transient failures first
        if self.remaining_failures.load(Ordering::Relaxed) > 0 {
            self.remaining_failures.fetch_sub(1, Ordering::Relaxed);
            return Err(Self::unavailable());
        }

        if self.should_fail.load(Ordering::Relaxed) {
            Err(Self::unavailable())
        } else {
            Ok(())
        }
    }

    fn unavailable() -> Error {
        Error::Api {
            status: 503,
            message: "mock store unavailable".to_string(),
        }
    }

    async fn record_command(&self, command: ControlCommand) -> Result<()> {
        self.command_count.fetch_add(1, Ordering::Relaxed);
        if let Some((status, reason)) = self.rejection.read().await.clone() {
            return Err(Error::rejected(status, reason));
        }
        self.commands.write().await.push(command);
        Ok(())
    }

    // --- Test control methods ---

    /// Replace the stored reading set.
    pub async fn set_readings(&self, readings: Vec<ReadingRecord>) {
        *self.readings.write().await = readings;
    }

    /// Append readings.
    pub async fn add_readings(&self, readings: Vec<ReadingRecord>) {
        self.readings.write().await.extend(readings);
    }

    /// Replace one device's history.
    pub async fn set_history(&self, device_id: &str, records: Vec<ReadingRecord>) {
        self.history
            .write()
            .await
            .insert(device_id.to_string(), records);
    }

    pub async fn set_intervals(&self, intervals: Vec<IntervalSetting>) {
        *self.intervals.write().await = intervals;
    }

    pub async fn set_relays(&self, relays: Vec<RelayAddress>) {
        *self.relays.write().await = relays;
    }

    /// Make every fetch fail (or succeed again).
    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::Relaxed);
    }

    /// Fail the next `count` fetches, then succeed.
    pub fn fail_next(&self, count: u32) {
        self.remaining_failures.store(count, Ordering::Relaxed);
    }

    /// Reject every command with this status and body text (`None` to accept).
    pub async fn set_rejection(&self, rejection: Option<(u16, &str)>) {
        *self.rejection.write().await = rejection.map(|(s, r)| (s, r.to_string()));
    }

    /// Set simulated fetch latency.
    ///
    /// Each fetch is delayed by this duration.
    /// Set to `Duration::ZERO` to disable latency simulation.
    pub fn set_fetch_latency(&self, latency: Duration) {
        self.fetch_latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    /// Commands accepted so far, in arrival order.
    pub async fn commands(&self) -> Vec<ControlCommand> {
        self.commands.read().await.clone()
    }

    /// Number of reading-set fetches started.
    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::Relaxed)
    }

    /// Number of commands received, accepted or not.
    pub fn command_count(&self) -> u32 {
        self.command_count.load(Ordering::Relaxed)
    }

    /// Highest number of reading-set fetches ever running at once.
    pub fn max_in_flight(&self) -> u32 {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Reading-set fetches running right now.
    pub fn in_flight(&self) -> u32 {
        self.in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TelemetrySource for MockStore {
    async fn fetch_readings(&self) -> Result<Vec<ReadingRecord>> {
        self.fetch_count.fetch_add(1, Ordering::Relaxed);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        self.check_should_fail().await?;
        Ok(self.readings.read().await.clone())
    }

    async fn fetch_history(&self, device_id: &str) -> Result<Vec<ReadingRecord>> {
        self.check_should_fail().await?;
        Ok(self
            .history
            .read()
            .await
            .get(device_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_intervals(&self) -> Result<Vec<IntervalSetting>> {
        self.check_should_fail().await?;
        Ok(self.intervals.read().await.clone())
    }

    async fn fetch_relays(&self) -> Result<Vec<RelayAddress>> {
        self.check_should_fail().await?;
        Ok(self.relays.read().await.clone())
    }
}

#[async_trait]
impl ControlPlane for MockStore {
    async fn send_interval(&self, device_id: &str, interval_seconds: u32) -> Result<()> {
        self.record_command(ControlCommand::SetInterval {
            device_id: device_id.to_string(),
            interval_seconds,
        })
        .await
    }

    async fn send_relay(&self, device_id: &str, action: RelayAction) -> Result<()> {
        self.record_command(ControlCommand::SetRelay {
            device_id: device_id.to_string(),
            action,
        })
        .await
    }
}

/// Builder for creating mock stores with custom contents.
#[derive(Debug, Default)]
pub struct MockStoreBuilder {
    readings: Vec<ReadingRecord>,
    history: HashMap<String, Vec<ReadingRecord>>,
    intervals: Vec<IntervalSetting>,
    relays: Vec<RelayAddress>,
    fetch_latency: Duration,
}

impl MockStoreBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one reading record.
    #[must_use]
    pub fn reading(mut self, record: ReadingRecord) -> Self {
        self.readings.push(record);
        self
    }

    /// Add several reading records.
    #[must_use]
    pub fn readings(mut self, records: impl IntoIterator<Item = ReadingRecord>) -> Self {
        self.readings.extend(records);
        self
    }

    /// Set one device's history.
    #[must_use]
    pub fn history(mut self, device_id: &str, records: Vec<ReadingRecord>) -> Self {
        self.history.insert(device_id.to_string(), records);
        self
    }

    /// Add an interval setting.
    #[must_use]
    pub fn interval(mut self, device_id: &str, interval_seconds: u32) -> Self {
        self.intervals.push(IntervalSetting {
            device_id: device_id.to_string(),
            interval_seconds,
        });
        self
    }

    /// Register a relay address.
    #[must_use]
    pub fn relay(mut self, device_id: &str, address: &str) -> Self {
        self.relays.push(RelayAddress {
            device_id: device_id.to_string(),
            address: address.to_string(),
            updated: None,
        });
        self
    }

    /// Delay every fetch by this much.
    #[must_use]
    pub fn fetch_latency(mut self, latency: Duration) -> Self {
        self.fetch_latency = latency;
        self
    }

    /// Build the mock store.
    #[must_use]
    pub fn build(self) -> MockStore {
        MockStore {
            readings: RwLock::new(self.readings),
            history: RwLock::new(self.history),
            intervals: RwLock::new(self.intervals),
            relays: RwLock::new(self.relays),
            fetch_latency_ms: AtomicU64::new(self.fetch_latency.as_millis() as u64),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_builder_populates_store() {
        let store = MockStore::builder()
            .reading(ReadingRecord::new("a", "2024-05-01T10:00:00Z"))
            .interval("a", 900)
            .relay("a", "10.0.0.5")
            .build();

        assert_eq!(store.fetch_readings().await.unwrap().len(), 1);
        assert_eq!(store.fetch_intervals().await.unwrap()[0].interval_seconds, 900);
        assert_eq!(store.fetch_relays().await.unwrap()[0].address, "10.0.0.5");
        assert!(store.fetch_history("a").await.unwrap().is_empty());
        assert_eq!(store.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_transient_failures() {
        let store = MockStore::new();
        store.fail_next(2);

        assert!(store.fetch_readings().await.is_err());
        assert!(store.fetch_readings().await.is_err());
        assert!(store.fetch_readings().await.is_ok());
    }

    #[tokio::test]
    async fn test_should_fail() {
        let store = MockStore::new();
        store.set_should_fail(true);
        let err = store.fetch_relays().await.unwrap_err();
        assert!(err.is_transport());

        store.set_should_fail(false);
        assert!(store.fetch_relays().await.is_ok());
    }

    #[tokio::test]
    async fn test_commands_recorded_or_rejected() {
        let store = MockStore::new();
        store.send_relay("a", RelayAction::On).await.unwrap();
        assert_eq!(store.commands().await.len(), 1);

        store.set_rejection(Some((404, "Device not found"))).await;
        let err = store.send_interval("a", 60).await.unwrap_err();
        assert!(matches!(err, Error::Rejected { status: 404, .. }));
        assert_eq!(store.commands().await.len(), 1);
        assert_eq!(store.command_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_guard_released_on_drop() {
        let store = MockStore::builder()
            .fetch_latency(Duration::from_secs(10))
            .build();

        let fetch = store.fetch_readings();
        let _ = tokio::time::timeout(Duration::from_secs(1), fetch).await;
        assert_eq!(store.in_flight(), 0);
        assert_eq!(store.max_in_flight(), 1);
    }
}
