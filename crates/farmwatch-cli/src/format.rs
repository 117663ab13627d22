//! Output formatting utilities for text, JSON, and CSV output.

use anyhow::{Context, Result};
use farmwatch_types::{DeviceSnapshot, HistorySeries, RelayAddress, ReportInterval};
use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::builder::Builder;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

use crate::cli::StyleMode;
use crate::style;

/// Formatting options for output.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    /// Disable colored output.
    pub no_color: bool,
    /// Omit header row in CSV output.
    pub no_header: bool,
    /// Use compact JSON output (no pretty-printing).
    pub compact: bool,
    /// Table styling for text output.
    pub style: StyleMode,
}

impl FormatOptions {
    /// Plain style implies no color.
    pub fn new(no_color: bool, style: StyleMode) -> Self {
        Self {
            no_color: no_color || style == StyleMode::Plain,
            style,
            ..Default::default()
        }
    }

    /// Create with no_header option for CSV output.
    pub fn with_no_header(mut self, no_header: bool) -> Self {
        self.no_header = no_header;
        self
    }

    /// Create with compact JSON option.
    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    /// Serialize value to JSON string, respecting compact option.
    pub fn as_json<T: Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.compact {
            serde_json::to_string(value)?
        } else {
            serde_json::to_string_pretty(value)?
        };
        Ok(json + "\n")
    }

    /// Serialize rows to CSV, respecting the no_header option.
    pub fn as_csv<T: Serialize>(&self, rows: impl IntoIterator<Item = T>) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(!self.no_header)
            .from_writer(Vec::new());
        for row in rows {
            writer.serialize(row).context("Failed to write CSV row")?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush CSV output: {}", e.error()))?;
        String::from_utf8(bytes).context("CSV output is not valid UTF-8")
    }
}

/// Human-readable UTC timestamp.
pub fn format_timestamp(ts: OffsetDateTime) -> String {
    let fmt = format_description!("[year]-[month]-[day] [hour]:[minute]:[second] UTC");
    ts.to_offset(time::UtcOffset::UTC)
        .format(&fmt)
        .unwrap_or_else(|_| ts.to_string())
}

fn rfc3339(ts: OffsetDateTime) -> String {
    ts.format(&Rfc3339).unwrap_or_else(|_| ts.to_string())
}

/// Format a measurement, or a placeholder when the device did not report it.
pub fn format_measurement(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{:.1} {}", v, unit),
        None => "--".to_string(),
    }
}

/// Interval label for allowed values, raw seconds otherwise.
pub fn format_interval(seconds: u32) -> String {
    match ReportInterval::from_seconds(seconds) {
        Some(interval) => interval.label().to_string(),
        None => format!("{}s", seconds),
    }
}

/// The allowed interval choices, with the current one marked.
pub fn format_interval_choices(current: u32, opts: &FormatOptions) -> String {
    ReportInterval::ALL
        .iter()
        .map(|choice| {
            let text = format!("{} ({}s)", choice.label(), choice.as_seconds());
            if choice.as_seconds() == current {
                if opts.no_color {
                    format!("[{}]", text)
                } else {
                    format!("[{}]", text.bold())
                }
            } else {
                text
            }
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

// ============================================================================
// Device cards
// ============================================================================

/// One device card.
pub fn format_device_card(snapshot: &DeviceSnapshot, opts: &FormatOptions) -> String {
    let reading = &snapshot.reading;
    let name = if opts.no_color {
        snapshot.device_id.clone()
    } else {
        snapshot.device_id.cyan().bold().to_string()
    };

    let relay = if snapshot.relay_available {
        let cmd = format!("farmwatch relay {} on|off", snapshot.device_id);
        if opts.no_color {
            format!("available ({})", cmd)
        } else {
            format!("{} ({})", "available".green(), cmd)
        }
    } else {
        "not registered".to_string()
    };

    let mut builder = Builder::default();
    builder.push_record(["Property", "Value"]);
    builder.push_record(["Temperature", &format_measurement(reading.temperature, "°C")]);
    builder.push_record(["Humidity", &format_measurement(reading.humidity, "%")]);
    builder.push_record(["Soil", &format_measurement(reading.soil, "%")]);
    builder.push_record(["Updated", &format_timestamp(snapshot.timestamp())]);
    builder.push_record(["Interval", &format_interval(snapshot.interval_seconds)]);
    builder.push_record([
        "Choices",
        &format_interval_choices(snapshot.interval_seconds, opts),
    ]);
    builder.push_record(["Relay", &relay]);

    let mut table = builder.build();
    style::apply_table_style(&mut table, opts.style);

    format!("{}\n{}\n", name, table)
}

/// Every device card, in the order given.
pub fn format_devices_text(snapshots: &[DeviceSnapshot], opts: &FormatOptions) -> String {
    if snapshots.is_empty() {
        return "No devices have reported yet.\n".to_string();
    }
    snapshots
        .iter()
        .map(|s| format_device_card(s, opts))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Flat device row for JSON and CSV output.
#[derive(Debug, Serialize)]
struct DeviceRow<'a> {
    device_id: &'a str,
    timestamp: String,
    temperature: Option<f64>,
    humidity: Option<f64>,
    soil: Option<f64>,
    interval_seconds: u32,
    interval_label: Option<&'static str>,
    relay_available: bool,
}

impl<'a> From<&'a DeviceSnapshot> for DeviceRow<'a> {
    fn from(s: &'a DeviceSnapshot) -> Self {
        Self {
            device_id: &s.device_id,
            timestamp: rfc3339(s.timestamp()),
            temperature: s.reading.temperature,
            humidity: s.reading.humidity,
            soil: s.reading.soil,
            interval_seconds: s.interval_seconds,
            interval_label: s.interval().map(|i| i.label()),
            relay_available: s.relay_available,
        }
    }
}

pub fn format_devices_json(snapshots: &[DeviceSnapshot], opts: &FormatOptions) -> Result<String> {
    let rows: Vec<DeviceRow<'_>> = snapshots.iter().map(DeviceRow::from).collect();
    opts.as_json(&rows)
}

pub fn format_devices_csv(snapshots: &[DeviceSnapshot], opts: &FormatOptions) -> Result<String> {
    opts.as_csv(snapshots.iter().map(DeviceRow::from))
}

// ============================================================================
// History
// ============================================================================

#[derive(Debug, Serialize)]
struct HistoryRow {
    timestamp: String,
    temperature: Option<f64>,
    humidity: Option<f64>,
}

pub fn format_history_json(series: &HistorySeries, opts: &FormatOptions) -> Result<String> {
    opts.as_json(series)
}

pub fn format_history_csv(series: &HistorySeries, opts: &FormatOptions) -> Result<String> {
    opts.as_csv(series.points.iter().map(|p| HistoryRow {
        timestamp: rfc3339(p.timestamp),
        temperature: p.temperature,
        humidity: p.humidity,
    }))
}

// ============================================================================
// Relay lookup
// ============================================================================

pub fn format_relay_text(device_id: &str, relay: Option<&RelayAddress>) -> String {
    match relay {
        Some(relay) => {
            let mut out = format!("Relay for {}: {}\n", device_id, relay.address);
            if let Some(updated) = relay.updated {
                out.push_str(&format!("Registered: {}\n", format_timestamp(updated)));
            }
            out
        }
        None => format!("No relay registered for {}\n", device_id),
    }
}

pub fn format_relay_json(relay: Option<&RelayAddress>, opts: &FormatOptions) -> Result<String> {
    opts.as_json(&relay)
}

#[cfg(test)]
mod tests {
    use super::*;
    use farmwatch_types::{AxisGranularity, Reading, SeriesPoint};
    use time::macros::datetime;

    fn snapshot(device: &str, interval: u32, relay: bool) -> DeviceSnapshot {
        DeviceSnapshot {
            device_id: device.to_string(),
            reading: Reading {
                device_id: device.to_string(),
                timestamp: datetime!(2024-05-01 10:05:00 UTC),
                temperature: Some(22.0),
                humidity: Some(41.0),
                soil: None,
            },
            interval_seconds: interval,
            relay_available: relay,
        }
    }

    fn plain() -> FormatOptions {
        FormatOptions::new(true, StyleMode::Rich)
    }

    #[test]
    fn test_format_measurement() {
        assert_eq!(format_measurement(Some(21.456), "°C"), "21.5 °C");
        assert_eq!(format_measurement(None, "%"), "--");
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(900), "15 min");
        assert_eq!(format_interval(3600), "1 hour");
        assert_eq!(format_interval(120), "120s");
    }

    #[test]
    fn test_interval_choices_mark_current() {
        let choices = format_interval_choices(300, &plain());
        assert!(choices.contains("[5 min (300s)]"));
        assert!(choices.contains("1 min (60s) |"));
        assert_eq!(choices.matches('[').count(), 1);

        // Non-standard stored value marks nothing
        assert!(!format_interval_choices(120, &plain()).contains('['));
    }

    #[test]
    fn test_device_card_table() {
        let card = format_device_card(&snapshot("sensor-001", 300, true), &plain());
        assert!(card.starts_with("sensor-001\n"));
        assert!(card.contains("╭"));
        assert!(card.contains("Property"));
        assert!(card.contains("22.0 °C"));
        assert!(card.contains("41.0 %"));
        let soil = card.lines().find(|l| l.contains("Soil")).unwrap();
        assert!(soil.contains("--"));
        assert!(card.contains("2024-05-01 10:05:00 UTC"));
        assert!(card.contains("5 min"));
        assert!(card.contains("farmwatch relay sensor-001 on|off"));

        let no_relay = format_device_card(&snapshot("a", 300, false), &plain());
        assert!(no_relay.contains("not registered"));
    }

    #[test]
    fn test_device_card_plain_style_has_no_borders() {
        let opts = FormatOptions::new(false, StyleMode::Plain);
        assert!(opts.no_color);

        let card = format_device_card(&snapshot("sensor-001", 900, false), &opts);
        assert!(!card.contains('│'));
        let interval = card.lines().find(|l| l.contains("Interval")).unwrap();
        assert!(interval.contains("15 min"));
    }

    #[test]
    fn test_devices_text_empty() {
        assert_eq!(
            format_devices_text(&[], &plain()),
            "No devices have reported yet.\n"
        );
    }

    #[test]
    fn test_devices_json() {
        let json = format_devices_json(&[snapshot("a", 900, true)], &plain()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["device_id"], "a");
        assert_eq!(value[0]["timestamp"], "2024-05-01T10:05:00Z");
        assert_eq!(value[0]["interval_label"], "15 min");
        assert_eq!(value[0]["relay_available"], true);
        assert!(value[0]["soil"].is_null());
    }

    #[test]
    fn test_devices_csv() {
        let snapshots = [snapshot("a", 300, true), snapshot("b", 120, false)];
        let csv = format_devices_csv(&snapshots, &plain()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "device_id,timestamp,temperature,humidity,soil,interval_seconds,interval_label,relay_available"
        );
        assert_eq!(lines[1], "a,2024-05-01T10:05:00Z,22.0,41.0,,300,5 min,true");
        assert_eq!(lines[2], "b,2024-05-01T10:05:00Z,22.0,41.0,,120,,false");

        let headless = format_devices_csv(&snapshots, &plain().with_no_header(true)).unwrap();
        assert_eq!(headless.lines().count(), 2);
    }

    #[test]
    fn test_history_csv_and_json() {
        let series = HistorySeries {
            device_id: "a".into(),
            points: vec![SeriesPoint {
                timestamp: datetime!(2024-05-01 08:00:00 UTC),
                temperature: Some(19.0),
                humidity: None,
            }],
            axis: AxisGranularity::Auto.resolve(),
        };
        let csv = format_history_csv(&series, &plain()).unwrap();
        assert_eq!(
            csv,
            "timestamp,temperature,humidity\n2024-05-01T08:00:00Z,19.0,\n"
        );

        let json = format_history_json(&series, &plain().with_compact(true)).unwrap();
        assert!(json.starts_with("{\"device_id\":\"a\""));
        assert!(json.ends_with('\n'));
    }

    #[test]
    fn test_relay_text() {
        let relay = RelayAddress {
            device_id: "a".into(),
            address: "10.0.0.5".into(),
            updated: Some(datetime!(2024-05-01 09:00:00 UTC)),
        };
        let text = format_relay_text("a", Some(&relay));
        assert!(text.contains("10.0.0.5"));
        assert!(text.contains("2024-05-01 09:00:00 UTC"));
        assert_eq!(format_relay_text("b", None), "No relay registered for b\n");
    }
}
