//! Trait abstractions over the reading store and the control plane.
//!
//! [`TelemetrySource`] and [`ControlPlane`] let the reducer pipeline, the
//! scheduler and the dispatcher run against the HTTP [`StoreClient`] in
//! production and against [`MockStore`] in tests.
//!
//! [`StoreClient`]: crate::client::StoreClient
//! [`MockStore`]: crate::mock::MockStore

use async_trait::async_trait;

use farmwatch_types::{IntervalSetting, ReadingRecord, RelayAction, RelayAddress};

use crate::error::Result;

/// Read access to stored telemetry and device configuration.
///
/// Every call reflects storage at call time; implementations do not cache.
///
/// # Example
///
/// ```ignore
/// use farmwatch_core::{TelemetrySource, Result};
///
/// async fn count_records<S: TelemetrySource>(source: &S) -> Result<usize> {
///     Ok(source.fetch_readings().await?.len())
/// }
/// ```
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// All known readings, in store order, not yet validated.
    async fn fetch_readings(&self) -> Result<Vec<ReadingRecord>>;

    /// One device's readings, time-ordered by the store.
    async fn fetch_history(&self, device_id: &str) -> Result<Vec<ReadingRecord>>;

    /// All stored interval settings. Malformed records are already dropped.
    async fn fetch_intervals(&self) -> Result<Vec<IntervalSetting>>;

    /// All registered relay addresses. Malformed records are already dropped.
    async fn fetch_relays(&self) -> Result<Vec<RelayAddress>>;
}

/// The service that accepts device commands.
///
/// Success means the command was accepted, not that the device complied.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Ask the device to report every `interval_seconds`.
    async fn send_interval(&self, device_id: &str, interval_seconds: u32) -> Result<()>;

    /// Switch the relay attached to the device.
    async fn send_relay(&self, device_id: &str, action: RelayAction) -> Result<()>;
}
