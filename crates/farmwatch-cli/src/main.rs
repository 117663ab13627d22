use std::io;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use farmwatch_cli::cli::{Cli, Commands, OutputFormat};
use farmwatch_cli::commands::{
    DashboardArgs, HistoryArgs, cmd_config, cmd_dashboard, cmd_devices, cmd_history, cmd_interval,
    cmd_relay, cmd_relay_info,
};
use farmwatch_cli::config::{
    Config, resolve_axis, resolve_base_url, resolve_device, resolve_refresh,
};
use farmwatch_cli::format::FormatOptions;
use farmwatch_cli::util::{require_device, store_client};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle completions command early (before tracing init)
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "farmwatch", &mut io::stdout());
        return Ok(());
    }

    // When quiet mode is enabled, suppress info-level logging
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = Config::load();
    let no_color = cli.no_color || config.no_color;
    let opts = FormatOptions::new(no_color, cli.style).with_compact(cli.compact);
    let base_url = resolve_base_url(cli.url.as_deref(), &config);
    let output = cli.output.as_ref();
    let json = cli.json;
    let pick_format = |format: OutputFormat| if json { OutputFormat::Json } else { format };

    match cli.command {
        Commands::Devices { output: out } => {
            let client = store_client(&base_url, &config)?;
            let opts = opts.with_no_header(out.no_header);
            cmd_devices(&client, pick_format(out.format), output, cli.quiet, &opts).await?;
        }
        Commands::Dashboard {
            interval,
            count,
            output: out,
        } => {
            let client = store_client(&base_url, &config)?;
            let opts = opts.with_no_header(out.no_header);
            cmd_dashboard(DashboardArgs {
                client,
                period: resolve_refresh(interval, &config),
                count,
                format: pick_format(out.format),
                output,
                quiet: cli.quiet,
                opts: &opts,
            })
            .await?;
        }
        Commands::Interval { device, seconds } => {
            let client = store_client(&base_url, &config)?;
            cmd_interval(client, &device, seconds, cli.quiet).await?;
        }
        Commands::Relay { device, action } => {
            let client = store_client(&base_url, &config)?;
            cmd_relay(client, &device, action, cli.quiet).await?;
        }
        Commands::RelayInfo { device, format } => {
            let client = store_client(&base_url, &config)?;
            cmd_relay_info(&client, &device, pick_format(format), output, &opts).await?;
        }
        Commands::History {
            device,
            axis,
            output: out,
        } => {
            let device = require_device(resolve_device(device, &config))?;
            let axis = resolve_axis(axis, &config)?;
            let client = store_client(&base_url, &config)?;
            let opts = opts.with_no_header(out.no_header);
            cmd_history(HistoryArgs {
                client: &client,
                device,
                axis,
                format: pick_format(out.format),
                output,
                opts: &opts,
            })
            .await?;
        }
        Commands::Config { action } => {
            cmd_config(action, cli.quiet)?;
        }
        Commands::Completions { .. } => {
            // Already handled above
        }
    }

    Ok(())
}
