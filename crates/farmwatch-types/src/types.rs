//! Core domain types for sensor telemetry and device control.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::ParseError;

/// Reporting interval applied when a device has no stored setting.
pub const DEFAULT_INTERVAL_SECS: u32 = 300;

/// Reporting interval choices a device can be switched to.
///
/// Only these values are ever sent to the control plane. Stored settings may
/// hold other positive values; those are still displayed as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[derive(Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum ReportInterval {
    /// 1 minute interval.
    OneMinute,
    /// 5 minute interval (the default).
    #[default]
    FiveMinutes,
    /// 15 minute interval.
    FifteenMinutes,
    /// 30 minute interval.
    ThirtyMinutes,
    /// 1 hour interval.
    OneHour,
}

impl ReportInterval {
    /// Every allowed interval, shortest first.
    pub const ALL: [ReportInterval; 5] = [
        ReportInterval::OneMinute,
        ReportInterval::FiveMinutes,
        ReportInterval::FifteenMinutes,
        ReportInterval::ThirtyMinutes,
        ReportInterval::OneHour,
    ];

    /// Get the interval in seconds.
    #[must_use]
    pub const fn as_seconds(&self) -> u32 {
        match self {
            ReportInterval::OneMinute => 60,
            ReportInterval::FiveMinutes => 300,
            ReportInterval::FifteenMinutes => 900,
            ReportInterval::ThirtyMinutes => 1800,
            ReportInterval::OneHour => 3600,
        }
    }

    /// Try to create from a seconds value.
    ///
    /// ```
    /// use farmwatch_types::ReportInterval;
    ///
    /// assert_eq!(ReportInterval::from_seconds(900), Some(ReportInterval::FifteenMinutes));
    /// assert_eq!(ReportInterval::from_seconds(120), None);
    /// ```
    #[must_use]
    pub const fn from_seconds(seconds: u32) -> Option<Self> {
        match seconds {
            60 => Some(ReportInterval::OneMinute),
            300 => Some(ReportInterval::FiveMinutes),
            900 => Some(ReportInterval::FifteenMinutes),
            1800 => Some(ReportInterval::ThirtyMinutes),
            3600 => Some(ReportInterval::OneHour),
            _ => None,
        }
    }

    /// Short operator-facing label, e.g. "15 min".
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            ReportInterval::OneMinute => "1 min",
            ReportInterval::FiveMinutes => "5 min",
            ReportInterval::FifteenMinutes => "15 min",
            ReportInterval::ThirtyMinutes => "30 min",
            ReportInterval::OneHour => "1 hour",
        }
    }
}

impl TryFrom<u32> for ReportInterval {
    type Error = ParseError;

    fn try_from(seconds: u32) -> Result<Self, Self::Error> {
        Self::from_seconds(seconds).ok_or(ParseError::InvalidInterval(i64::from(seconds)))
    }
}

impl From<ReportInterval> for u32 {
    fn from(interval: ReportInterval) -> Self {
        interval.as_seconds()
    }
}

impl fmt::Display for ReportInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Relay switch action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayAction {
    On,
    Off,
}

impl RelayAction {
    /// Path segment used by the control plane.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            RelayAction::On => "on",
            RelayAction::Off => "off",
        }
    }
}

impl fmt::Display for RelayAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelayAction {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "on" => Ok(RelayAction::On),
            "off" => Ok(RelayAction::Off),
            _ => Err(ParseError::InvalidRelayAction(s.to_string())),
        }
    }
}

/// One observation from a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub device_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Temperature in °C.
    pub temperature: Option<f64>,
    /// Relative humidity in percent.
    pub humidity: Option<f64>,
    /// Soil moisture in percent.
    pub soil: Option<f64>,
}

/// Stored reporting interval for one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalSetting {
    pub device_id: String,
    pub interval_seconds: u32,
}

/// Network locator of the relay attached to a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayAddress {
    pub device_id: String,
    /// Opaque locator, typically an IP address.
    pub address: String,
    /// When the relay last registered its address, if the store knows.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated: Option<OffsetDateTime>,
}

/// Latest known state of one device, joined with its configuration.
///
/// Snapshots are rebuilt from scratch on every refresh cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub device_id: String,
    /// The reading with the greatest timestamp for this device.
    pub reading: Reading,
    /// Effective reporting interval (stored value, or the default).
    pub interval_seconds: u32,
    /// Whether a relay address is registered for this device.
    pub relay_available: bool,
}

impl DeviceSnapshot {
    /// Freshness timestamp of the snapshot.
    #[must_use]
    pub fn timestamp(&self) -> OffsetDateTime {
        self.reading.timestamp
    }

    /// The effective interval as an allowed choice, if it is one.
    #[must_use]
    pub fn interval(&self) -> Option<ReportInterval> {
        ReportInterval::from_seconds(self.interval_seconds)
    }
}

/// A command for the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlCommand {
    /// Change a device's reporting interval.
    SetInterval {
        device_id: String,
        interval_seconds: u32,
    },
    /// Switch a device's relay.
    SetRelay {
        device_id: String,
        action: RelayAction,
    },
}

impl ControlCommand {
    /// Device the command targets.
    #[must_use]
    pub fn device_id(&self) -> &str {
        match self {
            ControlCommand::SetInterval { device_id, .. }
            | ControlCommand::SetRelay { device_id, .. } => device_id,
        }
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlCommand::SetInterval {
                device_id,
                interval_seconds,
            } => write!(f, "set interval of {} to {}s", device_id, interval_seconds),
            ControlCommand::SetRelay { device_id, action } => {
                write!(f, "switch relay of {} {}", device_id, action)
            }
        }
    }
}
