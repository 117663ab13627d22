//! Relay command implementations.

use std::path::PathBuf;

use anyhow::{Context, Result};
use farmwatch_core::{ControlDispatcher, RelayAction, StoreClient};

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, format_relay_json, format_relay_text};
use crate::util::write_output;

pub async fn cmd_relay(
    client: StoreClient,
    device: &str,
    action: RelayAction,
    quiet: bool,
) -> Result<()> {
    let dispatcher = ControlDispatcher::new(client);
    dispatcher
        .set_relay(device, action)
        .await
        .with_context(|| format!("Failed to switch relay of {} {}", device, action))?;

    if !quiet {
        println!("Relay of {} switched {}.", device, action);
    }
    Ok(())
}

pub async fn cmd_relay_info(
    client: &StoreClient,
    device: &str,
    format: OutputFormat,
    output: Option<&PathBuf>,
    opts: &FormatOptions,
) -> Result<()> {
    let relay = client
        .relay(device)
        .await
        .with_context(|| format!("Failed to look up relay for {}", device))?;

    let content = match format {
        OutputFormat::Json => format_relay_json(relay.as_ref(), opts)?,
        OutputFormat::Csv => opts.as_csv(relay.iter())?,
        OutputFormat::Text => format_relay_text(device, relay.as_ref()),
    };
    write_output(output, &content)
}
