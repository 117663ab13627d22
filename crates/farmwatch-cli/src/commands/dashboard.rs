//! Dashboard command implementation.
//!
//! Drives a [`RefreshScheduler`] and redraws the device list on every
//! successful refresh. A failed refresh leaves the last drawn list in place
//! and prints a one-line notice.

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use farmwatch_core::{RefreshScheduler, RefreshUpdate, SchedulerOptions, StoreClient};
use owo_colors::OwoColorize;
use time::OffsetDateTime;

use crate::cli::OutputFormat;
use crate::commands::devices::render_snapshots;
use crate::format::{FormatOptions, format_timestamp};
use crate::util::{append_output, write_output};

/// Arguments for the dashboard command.
pub struct DashboardArgs<'a> {
    pub client: StoreClient,
    pub period: Duration,
    pub count: u32,
    pub format: OutputFormat,
    pub output: Option<&'a PathBuf>,
    pub quiet: bool,
    pub opts: &'a FormatOptions,
}

pub async fn cmd_dashboard(args: DashboardArgs<'_>) -> Result<()> {
    let DashboardArgs {
        client,
        period,
        count,
        format,
        output,
        quiet,
        opts,
    } = args;

    let base_url = client.base_url().to_string();
    let options = SchedulerOptions::builder().period(period).build();
    let mut scheduler = RefreshScheduler::new(Arc::new(client), options)?;

    // Redraw in place only when text goes straight to a terminal.
    let redraw = format == OutputFormat::Text && output.is_none() && io::stdout().is_terminal();

    if !quiet {
        let header = if opts.no_color {
            format!("Dashboard: {}", base_url)
        } else {
            format!("Dashboard: {}", base_url.cyan())
        };
        eprintln!("{}", header);
        eprintln!(
            "Refresh: every {}s | Press Ctrl+C to stop",
            period.as_secs()
        );
    }

    let mut refreshes: u32 = 0;
    let mut csv_opts = *opts;

    loop {
        let update = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                eprintln!("\nShutting down...");
                break;
            }
            update = scheduler.recv() => update,
        };

        match update {
            Some(RefreshUpdate::Snapshots(snapshots)) => {
                refreshes += 1;
                match format {
                    OutputFormat::Text => {
                        let mut content = String::new();
                        if redraw {
                            content.push_str("\x1b[2J\x1b[H");
                        }
                        content.push_str(&format!(
                            "Updated {} | {} device(s)\n\n",
                            format_timestamp(OffsetDateTime::now_utc()),
                            snapshots.len()
                        ));
                        content.push_str(&render_snapshots(&snapshots, format, opts)?);
                        if redraw {
                            write_output(None, &content)?;
                        } else {
                            append_output(output, &(content + "\n"))?;
                        }
                    }
                    OutputFormat::Json => {
                        let content = render_snapshots(&snapshots, format, &opts.with_compact(true))?;
                        append_output(output, &content)?;
                    }
                    OutputFormat::Csv => {
                        // Header once per session, rows on every refresh
                        let content = render_snapshots(&snapshots, format, &csv_opts)?;
                        csv_opts = csv_opts.with_no_header(true);
                        append_output(output, &content)?;
                    }
                }

                if count > 0 && refreshes >= count {
                    break;
                }
            }
            Some(RefreshUpdate::Failed(reason)) => {
                let notice = format!("Refresh failed, showing last data: {}", reason);
                if opts.no_color {
                    eprintln!("{}", notice);
                } else {
                    eprintln!("{}", notice.yellow());
                }
            }
            None => break,
        }
    }

    let stats = scheduler.stats();
    tracing::debug!(
        completed = stats.cycles_completed,
        failed = stats.cycles_failed,
        dropped = stats.ticks_dropped,
        skipped = stats.readings_skipped,
        "Dashboard stopped"
    );
    scheduler.close();
    Ok(())
}
