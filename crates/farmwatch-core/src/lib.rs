//! Telemetry aggregation and device control for farmwatch sensors.
//!
//! Field devices (temperature/humidity/soil sensors, some with an attached
//! irrigation relay) report into a backend store. This crate reads that
//! store, reduces the raw reading set to one current state per device, and
//! forwards interval and relay commands back to the control plane.
//!
//! # Features
//!
//! - **Store client**: HTTP access to readings, history, interval settings and relay addresses
//! - **Latest-state reduction**: one freshest reading per device, malformed records skipped
//! - **Device view model**: readings joined with effective interval and relay availability
//! - **Control dispatch**: locally validated interval and relay commands
//! - **Periodic refresh**: cancellable, never more than one cycle in flight
//! - **History charts**: aligned series, resolved axis config, stale results discarded
//!
//! # Quick Start
//!
//! ```no_run
//! use farmwatch_core::{StoreClient, run_cycle};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = StoreClient::new("http://127.0.0.1:3000")?;
//!
//!     let output = run_cycle(&client).await?;
//!     for snapshot in &output.snapshots {
//!         println!(
//!             "{}: {:?} °C, every {}s, relay: {}",
//!             snapshot.device_id,
//!             snapshot.reading.temperature,
//!             snapshot.interval_seconds,
//!             snapshot.relay_available
//!         );
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod cycle;
pub mod dispatcher;
pub mod error;
pub mod history;
pub mod mock;
pub mod reducer;
pub mod scheduler;
pub mod traits;
pub mod view_model;

pub use client::{DEFAULT_REQUEST_TIMEOUT, StoreClient};
pub use cycle::{CycleOutput, run_cycle};
pub use dispatcher::ControlDispatcher;
pub use error::{Error, Result};
pub use history::{
    ChartOutcome, ChartRequest, ChartSurface, HistoryChart, build_series, load_history,
};
pub use mock::{MockStore, MockStoreBuilder};
pub use reducer::{LatestReadings, latest_by_device};
pub use scheduler::{
    DEFAULT_REFRESH_PERIOD, RefreshScheduler, RefreshUpdate, SchedulerOptions,
    SchedulerOptionsBuilder, SchedulerState, SchedulerStats,
};
pub use traits::{ControlPlane, TelemetrySource};
pub use view_model::build_snapshots;

// Re-export from farmwatch-types
pub use farmwatch_types::{
    AxisConfig, AxisGranularity, ControlCommand, DeviceSnapshot, HistorySeries, IntervalSetting,
    Reading, ReadingRecord, RelayAction, RelayAddress, ReportInterval,
};
