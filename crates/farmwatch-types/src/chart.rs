//! History chart shapes: axis granularity and time series.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::ParseError;

/// Time-axis bucket unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Minute,
    Hour,
    Day,
}

impl TimeUnit {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            TimeUnit::Minute => "minute",
            TimeUnit::Hour => "hour",
            TimeUnit::Day => "day",
        }
    }

    /// Tick label format handed to the chart for this unit.
    #[must_use]
    pub const fn display_format(&self) -> &'static str {
        match self {
            TimeUnit::Minute | TimeUnit::Hour => "HH:mm",
            TimeUnit::Day => "MMM d",
        }
    }

    /// Length of one unit in seconds.
    #[must_use]
    pub const fn seconds(&self) -> i64 {
        match self {
            TimeUnit::Minute => 60,
            TimeUnit::Hour => 3_600,
            TimeUnit::Day => 86_400,
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeUnit {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minute" | "min" | "m" => Ok(TimeUnit::Minute),
            "hour" | "h" => Ok(TimeUnit::Hour),
            "day" | "d" => Ok(TimeUnit::Day),
            _ => Err(ParseError::InvalidGranularity(s.to_string())),
        }
    }
}

/// Operator's choice of time-axis granularity.
///
/// Text form is `auto` (or empty) or `<unit>-<step>`:
///
/// ```
/// use farmwatch_types::{AxisGranularity, TimeUnit};
///
/// assert_eq!("auto".parse::<AxisGranularity>().unwrap(), AxisGranularity::Auto);
/// assert_eq!(
///     "minute-15".parse::<AxisGranularity>().unwrap(),
///     AxisGranularity::Fixed { unit: TimeUnit::Minute, step: 15 }
/// );
/// assert!("hour-0".parse::<AxisGranularity>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AxisGranularity {
    /// Let the chart infer the bucket size.
    #[default]
    Auto,
    /// Fixed unit with an integer step of at least 1.
    Fixed { unit: TimeUnit, step: u32 },
}

impl AxisGranularity {
    /// Resolve into the configuration object handed to the chart.
    #[must_use]
    pub fn resolve(&self) -> AxisConfig {
        match *self {
            AxisGranularity::Auto => AxisConfig::default(),
            AxisGranularity::Fixed { unit, step } => AxisConfig {
                unit: Some(unit),
                step_size: Some(step),
                display_format: Some(unit.display_format().to_string()),
            },
        }
    }
}

impl fmt::Display for AxisGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisGranularity::Auto => f.write_str("auto"),
            AxisGranularity::Fixed { unit, step } => write!(f, "{}-{}", unit, step),
        }
    }
}

impl FromStr for AxisGranularity {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
            return Ok(AxisGranularity::Auto);
        }
        let invalid = || ParseError::InvalidGranularity(s.to_string());
        let (unit, step) = trimmed.split_once('-').ok_or_else(invalid)?;
        let unit: TimeUnit = unit.parse().map_err(|_| invalid())?;
        let step: u32 = step.trim().parse().map_err(|_| invalid())?;
        if step == 0 {
            return Err(invalid());
        }
        Ok(AxisGranularity::Fixed { unit, step })
    }
}

/// Resolved x-axis configuration. All `None` means automatic bucketing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisConfig {
    pub unit: Option<TimeUnit>,
    pub step_size: Option<u32>,
    pub display_format: Option<String>,
}

impl AxisConfig {
    /// Whether the chart should pick the bucket size itself.
    #[must_use]
    pub fn is_auto(&self) -> bool {
        self.unit.is_none()
    }

    /// Tick spacing in seconds for a fixed axis.
    #[must_use]
    pub fn tick_seconds(&self) -> Option<i64> {
        let unit = self.unit?;
        Some(unit.seconds() * i64::from(self.step_size.unwrap_or(1)))
    }
}

/// One point of a device's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
}

/// A device's history shaped for charting.
///
/// Points keep the order the store returned them in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistorySeries {
    pub device_id: String,
    pub points: Vec<SeriesPoint>,
    pub axis: AxisConfig,
}

impl HistorySeries {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// X-axis values.
    pub fn timestamps(&self) -> Vec<OffsetDateTime> {
        self.points.iter().map(|p| p.timestamp).collect()
    }

    /// Temperature series, aligned with [`timestamps`](Self::timestamps).
    pub fn temperatures(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.temperature).collect()
    }

    /// Humidity series, aligned with [`timestamps`](Self::timestamps).
    pub fn humidities(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.humidity).collect()
    }
}
