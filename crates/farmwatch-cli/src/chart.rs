//! Text rendering of history charts.
//!
//! [`TextChart`] is the terminal's [`ChartSurface`]: it draws one table row
//! per point with a temperature bar, labelling rows on the resolved axis ticks.

use farmwatch_core::ChartSurface;
use farmwatch_types::{AxisConfig, HistorySeries, TimeUnit};
use tabled::builder::Builder;
use time::OffsetDateTime;
use time::macros::format_description;

use crate::cli::StyleMode;
use crate::format::{format_measurement, format_timestamp};
use crate::style;

/// A chart drawn as a text table.
#[derive(Debug, Clone)]
pub struct TextChart {
    bar_width: usize,
    style: StyleMode,
    rendered: Option<String>,
}

impl TextChart {
    pub fn new(bar_width: usize, style: StyleMode) -> Self {
        Self {
            bar_width: bar_width.max(1),
            style,
            rendered: None,
        }
    }

    /// A chart whose bars fit the current terminal width.
    pub fn for_terminal(mode: StyleMode) -> Self {
        Self::new(style::chart_bar_width(style::terminal_width()), mode)
    }

    /// The chart currently drawn, if any.
    pub fn rendered(&self) -> Option<&str> {
        self.rendered.as_deref()
    }
}

impl ChartSurface for TextChart {
    fn build(&mut self, series: &HistorySeries) {
        self.rendered = Some(render_series(series, self.bar_width, self.style));
    }

    fn dispose(&mut self) {
        self.rendered = None;
    }
}

fn describe_axis(axis: &AxisConfig) -> String {
    match (axis.unit, axis.step_size) {
        (Some(unit), Some(step)) => format!(
            "every {} {}{} ({})",
            step,
            unit,
            if step == 1 { "" } else { "s" },
            axis.display_format.as_deref().unwrap_or("")
        ),
        _ => "auto".to_string(),
    }
}

/// Tick label for a timestamp under the axis' display format.
fn tick_label(ts: OffsetDateTime, unit: Option<TimeUnit>) -> String {
    let result = match unit {
        Some(TimeUnit::Minute | TimeUnit::Hour) => {
            ts.format(format_description!("[hour]:[minute]"))
        }
        Some(TimeUnit::Day) => {
            ts.format(format_description!("[month repr:short] [day padding:none]"))
        }
        None => return format_timestamp(ts),
    };
    result.unwrap_or_else(|_| ts.to_string())
}

/// Render a series as text. Public so callers can render without a chart slot.
pub fn render_series(series: &HistorySeries, bar_width: usize, table_style: StyleMode) -> String {
    let mut out = format!(
        "History for {} ({} points, axis: {})\n",
        series.device_id,
        series.len(),
        describe_axis(&series.axis)
    );
    if series.is_empty() {
        out.push_str("No readings stored for this device.\n");
        return out;
    }

    let temps: Vec<f64> = series.points.iter().filter_map(|p| p.temperature).collect();
    let min = temps.iter().copied().fold(f64::INFINITY, f64::min);
    let max = temps.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let tick = series.axis.tick_seconds();
    let mut last_bucket: Option<i64> = None;

    let mut builder = Builder::default();
    builder.push_record(["Time", "Temperature", "°C", "Humidity"]);

    for point in &series.points {
        // Fixed axes only label the first row of each tick bucket.
        let label = match tick {
            Some(tick) => {
                let bucket = point.timestamp.unix_timestamp().div_euclid(tick);
                if last_bucket == Some(bucket) {
                    String::new()
                } else {
                    last_bucket = Some(bucket);
                    tick_label(point.timestamp, series.axis.unit)
                }
            }
            None => tick_label(point.timestamp, None),
        };

        let bar_len = match point.temperature {
            Some(t) if max > min => {
                (((t - min) / (max - min)) * bar_width as f64).round() as usize
            }
            Some(_) => bar_width / 2,
            None => 0,
        };
        let bar = "#".repeat(bar_len.max(usize::from(point.temperature.is_some())));

        builder.push_record([
            label,
            bar,
            format_measurement(point.temperature, "°C"),
            format_measurement(point.humidity, "%"),
        ]);
    }

    let mut table = builder.build();
    style::apply_table_style(&mut table, table_style);
    out.push_str(&table.to_string());
    out.push('\n');
    out
}
