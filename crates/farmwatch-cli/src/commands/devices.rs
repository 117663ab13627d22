//! Devices command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use farmwatch_core::{DeviceSnapshot, StoreClient, run_cycle};

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, format_devices_csv, format_devices_json, format_devices_text};
use crate::util::write_output;

/// Render snapshots in the requested format.
pub(crate) fn render_snapshots(
    snapshots: &[DeviceSnapshot],
    format: OutputFormat,
    opts: &FormatOptions,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format_devices_text(snapshots, opts)),
        OutputFormat::Json => format_devices_json(snapshots, opts),
        OutputFormat::Csv => format_devices_csv(snapshots, opts),
    }
}

pub async fn cmd_devices(
    client: &StoreClient,
    format: OutputFormat,
    output: Option<&PathBuf>,
    quiet: bool,
    opts: &FormatOptions,
) -> Result<()> {
    let cycle = run_cycle(client)
        .await
        .with_context(|| format!("Failed to load devices from {}", client.base_url()))?;

    if cycle.skipped > 0 && !quiet {
        eprintln!(
            "Skipped {} malformed reading(s); run with --verbose for details.",
            cycle.skipped
        );
    }

    let content = render_snapshots(&cycle.snapshots, format, opts)?;
    write_output(output, &content)
}
