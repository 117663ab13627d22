//! Platform-agnostic types for farmwatch sensor telemetry and device control.
//!
//! This crate holds the data model shared by the core library and the CLI:
//!
//! - Wire records exactly as the reading store serves them ([`wire`])
//! - Domain values: readings, interval settings, relay addresses, device
//!   snapshots and control commands ([`types`])
//! - History chart shapes: axis granularity and time series ([`chart`])
//! - Data-quality errors raised while converting records ([`error`])
//!
//! # Example
//!
//! ```
//! use farmwatch_types::{Reading, ReadingRecord, ReportInterval};
//!
//! let record = ReadingRecord::new("sensor-001", "2024-05-01T10:05:00Z").with_temperature(22.0);
//! let reading = Reading::try_from(&record).unwrap();
//! assert_eq!(reading.device_id, "sensor-001");
//! assert_eq!(ReportInterval::default().as_seconds(), 300);
//! ```

pub mod chart;
pub mod error;
pub mod types;
pub mod wire;

pub use chart::{AxisConfig, AxisGranularity, HistorySeries, SeriesPoint, TimeUnit};
pub use error::{ParseError, ParseResult};
pub use types::{
    ControlCommand, DEFAULT_INTERVAL_SECS, DeviceSnapshot, IntervalSetting, Reading,
    RelayAction, RelayAddress, ReportInterval,
};
pub use wire::{IntervalRecord, ReadingRecord, RelayRecord, SetIntervalRequest, parse_timestamp};
