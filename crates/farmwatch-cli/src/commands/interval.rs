//! Interval command implementation.

use anyhow::{Result, bail};
use farmwatch_core::{ControlDispatcher, Error, ReportInterval, StoreClient};

use crate::format::format_interval;

pub async fn cmd_interval(
    client: StoreClient,
    device: &str,
    seconds: u32,
    quiet: bool,
) -> Result<()> {
    let dispatcher = ControlDispatcher::new(client);

    match dispatcher.set_interval(device, seconds).await {
        Ok(()) => {
            if !quiet {
                println!(
                    "Reporting interval for {} set to {}. The dashboard shows it after the next refresh.",
                    device,
                    format_interval(seconds)
                );
            }
            Ok(())
        }
        Err(Error::InvalidInterval(_)) => {
            let allowed: Vec<String> = ReportInterval::ALL
                .iter()
                .map(|i| format!("{} ({})", i.as_seconds(), i.label()))
                .collect();
            bail!(
                "Invalid interval: {} seconds. Valid values: {}",
                seconds,
                allowed.join(", ")
            )
        }
        Err(e) => Err(anyhow::Error::new(e)
            .context(format!("Failed to change reporting interval of {}", device))),
    }
}
