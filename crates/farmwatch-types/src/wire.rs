//! Wire records as served by the reading store.
//!
//! The backend is inconsistent about key casing: readings and intervals use
//! `DeviceID`/`Timestamp`, relays use `device_id`/`ip`, and request bodies use
//! camel case. Every variant is accepted here so nothing past this module has
//! to care. All fields are optional on the wire; conversion into the domain
//! types in [`crate::types`] is where required fields are enforced.

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::error::{ParseError, ParseResult};
use crate::types::{IntervalSetting, Reading, RelayAddress};

/// Layouts tried after RFC 3339. Values without an offset are taken as UTC.
const NAIVE_LAYOUTS: [&str; 4] = [
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]",
    "[year]-[month]-[day] [hour]:[minute]:[second]",
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]",
    "[year]-[month]-[day]T[hour]:[minute]:[second]",
];

/// Parse a store timestamp into a comparable point in time.
///
/// ```
/// use farmwatch_types::parse_timestamp;
///
/// assert!(parse_timestamp("2024-05-01T10:05:00+07:00").is_ok());
/// assert!(parse_timestamp("2024-05-01 10:05:00").is_ok());
/// assert!(parse_timestamp("yesterday").is_err());
/// ```
pub fn parse_timestamp(raw: &str) -> ParseResult<OffsetDateTime> {
    let trimmed = raw.trim();
    if let Ok(ts) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Ok(ts);
    }
    for layout in NAIVE_LAYOUTS {
        let Ok(format) = time::format_description::parse(layout) else {
            continue;
        };
        if let Ok(ts) = PrimitiveDateTime::parse(trimmed, &format) {
            return Ok(ts.assume_utc());
        }
    }
    Err(ParseError::InvalidTimestamp(raw.to_string()))
}

fn required(value: Option<&str>, field: &'static str) -> ParseResult<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ParseError::MissingField(field)),
    }
}

/// A reading exactly as the store returned it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadingRecord {
    #[serde(
        default,
        alias = "DeviceID",
        alias = "deviceID",
        alias = "deviceId",
        alias = "DeviceId"
    )]
    pub device_id: Option<String>,
    #[serde(default, alias = "Timestamp")]
    pub timestamp: Option<String>,
    #[serde(default, alias = "Temperature")]
    pub temperature: Option<f64>,
    #[serde(default, alias = "Humidity")]
    pub humidity: Option<f64>,
    #[serde(default, alias = "Soil")]
    pub soil: Option<f64>,
}

impl ReadingRecord {
    /// Convenience constructor, mostly for tests and fixtures.
    pub fn new(device_id: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            device_id: Some(device_id.into()),
            timestamp: Some(timestamp.into()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_temperature(mut self, celsius: f64) -> Self {
        self.temperature = Some(celsius);
        self
    }

    #[must_use]
    pub fn with_humidity(mut self, percent: f64) -> Self {
        self.humidity = Some(percent);
        self
    }

    #[must_use]
    pub fn with_soil(mut self, percent: f64) -> Self {
        self.soil = Some(percent);
        self
    }
}

impl TryFrom<&ReadingRecord> for Reading {
    type Error = ParseError;

    fn try_from(record: &ReadingRecord) -> Result<Self, Self::Error> {
        let device_id = required(record.device_id.as_deref(), "device_id")?;
        let raw_ts = record
            .timestamp
            .as_deref()
            .ok_or(ParseError::MissingField("timestamp"))?;
        let timestamp = parse_timestamp(raw_ts)?;
        Ok(Reading {
            device_id,
            timestamp,
            temperature: record.temperature,
            humidity: record.humidity,
            soil: record.soil,
        })
    }
}

/// An interval setting as the store returned it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalRecord {
    #[serde(
        default,
        alias = "DeviceID",
        alias = "deviceID",
        alias = "deviceId",
        alias = "DeviceId"
    )]
    pub device_id: Option<String>,
    #[serde(default, alias = "IntervalSeconds", alias = "intervalSeconds")]
    pub interval_seconds: Option<i64>,
}

impl TryFrom<&IntervalRecord> for IntervalSetting {
    type Error = ParseError;

    fn try_from(record: &IntervalRecord) -> Result<Self, Self::Error> {
        let device_id = required(record.device_id.as_deref(), "device_id")?;
        let raw = record
            .interval_seconds
            .ok_or(ParseError::MissingField("interval_seconds"))?;
        let interval_seconds = u32::try_from(raw)
            .ok()
            .filter(|s| *s > 0)
            .ok_or(ParseError::InvalidInterval(raw))?;
        Ok(IntervalSetting {
            device_id,
            interval_seconds,
        })
    }
}

/// A relay registration as the store returned it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayRecord {
    #[serde(
        default,
        alias = "DeviceID",
        alias = "deviceID",
        alias = "deviceId",
        alias = "DeviceId"
    )]
    pub device_id: Option<String>,
    #[serde(default, alias = "ip", alias = "IP", alias = "Address")]
    pub address: Option<String>,
    #[serde(default, alias = "Updated")]
    pub updated: Option<String>,
}

impl TryFrom<&RelayRecord> for RelayAddress {
    type Error = ParseError;

    fn try_from(record: &RelayRecord) -> Result<Self, Self::Error> {
        let device_id = required(record.device_id.as_deref(), "device_id")?;
        let address = required(record.address.as_deref(), "address")?;
        // Registration time is informational; a bad value does not void the address.
        let updated = record
            .updated
            .as_deref()
            .and_then(|raw| parse_timestamp(raw).ok());
        Ok(RelayAddress {
            device_id,
            address,
            updated,
        })
    }
}

/// Body of `POST /api/v1/interval`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetIntervalRequest {
    pub device_id: String,
    pub interval_seconds: u32,
}
