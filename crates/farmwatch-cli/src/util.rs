//! Utility functions for CLI operations.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use farmwatch_core::StoreClient;

use crate::config::Config;

/// Get device identifier, with helpful error message.
pub fn require_device(device: Option<String>) -> Result<String> {
    device.ok_or_else(|| {
        anyhow::anyhow!(
            "No device specified. Pass a device id or set FARMWATCH_DEVICE environment variable.\n\
             Run 'farmwatch devices' to list devices that have reported, or\n\
             'farmwatch config set device <ID>' to store a default."
        )
    })
}

/// Build the store client from the resolved URL and configured timeout.
pub fn store_client(base_url: &str, config: &Config) -> Result<StoreClient> {
    StoreClient::with_timeout(base_url, config.request_timeout())
        .with_context(|| format!("Cannot use backend URL '{}'", base_url))
}

/// Write output to file or stdout
pub fn write_output(output: Option<&PathBuf>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }
        None => {
            print!("{}", content);
            io::stdout().flush()?;
        }
    }
    Ok(())
}

/// Append output to file, or write to stdout.
pub fn append_output(output: Option<&PathBuf>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            let mut file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            file.write_all(content.as_bytes())
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }
        None => {
            print!("{}", content);
            io::stdout().flush()?;
        }
    }
    Ok(())
}
