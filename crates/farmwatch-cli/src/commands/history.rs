//! History command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use farmwatch_core::{AxisGranularity, ChartOutcome, HistoryChart, StoreClient, load_history};

use crate::chart::TextChart;
use crate::cli::OutputFormat;
use crate::format::{FormatOptions, format_history_csv, format_history_json};
use crate::util::write_output;

/// Arguments for the history command.
pub struct HistoryArgs<'a> {
    pub client: &'a StoreClient,
    pub device: String,
    pub axis: AxisGranularity,
    pub format: OutputFormat,
    pub output: Option<&'a PathBuf>,
    pub opts: &'a FormatOptions,
}

pub async fn cmd_history(args: HistoryArgs<'_>) -> Result<()> {
    let HistoryArgs {
        client,
        device,
        axis,
        format,
        output,
        opts,
    } = args;

    let content = match format {
        OutputFormat::Text => {
            let mut chart = HistoryChart::new(TextChart::for_terminal(opts.style));
            let outcome = chart
                .load(client, &device, axis)
                .await
                .with_context(|| format!("Failed to load history for {}", device))?;
            let text = match outcome {
                ChartOutcome::Rendered => chart.surface().rendered().unwrap_or_default().to_string(),
                ChartOutcome::Discarded => String::new(),
            };
            chart.teardown();
            text
        }
        OutputFormat::Json | OutputFormat::Csv => {
            let series = load_history(client, &device, axis)
                .await
                .with_context(|| format!("Failed to load history for {}", device))?;
            if format == OutputFormat::Json {
                format_history_json(&series, opts)?
            } else {
                format_history_csv(&series, opts)?
            }
        }
    };

    write_output(output, &content)
}
