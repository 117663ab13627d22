//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use farmwatch_types::{AxisGranularity, RelayAction};

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

/// Visual styling mode for text output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum StyleMode {
    /// Bordered tables with colors (default)
    #[default]
    Rich,
    /// Borderless tables, no colors (for scripting)
    Plain,
}

/// Reusable output format arguments
#[derive(Debug, Clone, Args)]
pub struct OutputArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Omit header row in CSV output (useful for appending)
    #[arg(long)]
    pub no_header: bool,
}

#[derive(Parser)]
#[command(name = "farmwatch")]
#[command(author, version, about = "Dashboard and controls for farmwatch sensors", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Backend URL (overrides config)
    #[arg(long, global = true, env = "FARMWATCH_URL")]
    pub url: Option<String>,

    /// Output as JSON (shorthand for --format json)
    #[arg(long, global = true)]
    pub json: bool,

    /// Output compact JSON (no pretty-printing)
    #[arg(long, global = true)]
    pub compact: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Visual styling mode (rich, plain)
    #[arg(
        long,
        global = true,
        value_enum,
        default_value = "rich",
        env = "FARMWATCH_STYLE"
    )]
    pub style: StyleMode,

    /// Write output to file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the current state of every device
    Devices {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Refresh the device list periodically until interrupted
    Dashboard {
        /// Refresh period in seconds (overrides config)
        #[arg(short, long)]
        interval: Option<u64>,

        /// Number of refreshes before exiting (0 for unlimited)
        #[arg(short = 'n', long, default_value = "0")]
        count: u32,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Change a device's reporting interval
    Interval {
        /// Device identifier
        device: String,

        /// Interval in seconds (valid: 60, 300, 900, 1800, 3600)
        seconds: u32,
    },

    /// Switch a device's relay on or off
    Relay {
        /// Device identifier
        device: String,

        /// Relay action
        #[arg(value_parser = parse_relay_action)]
        action: RelayAction,
    },

    /// Show the relay registered for a device
    RelayInfo {
        /// Device identifier
        device: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a device's reading history
    History {
        /// Device identifier, or use FARMWATCH_DEVICE / the configured default
        #[arg(env = "FARMWATCH_DEVICE")]
        device: Option<String>,

        /// Time axis granularity: auto, or unit-step (e.g. hour-1, minute-30, day-1)
        #[arg(short, long, value_parser = parse_axis)]
        axis: Option<AxisGranularity>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Parse relay action ("on" / "off", any case)
fn parse_relay_action(s: &str) -> Result<RelayAction, String> {
    s.parse().map_err(|e| format!("{e}. Use: on, off"))
}

/// Parse axis granularity
fn parse_axis(s: &str) -> Result<AxisGranularity, String> {
    s.parse()
        .map_err(|e| format!("{e}. Use: auto, minute-N, hour-N or day-N"))
}

/// Configuration keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigKey {
    /// Backend base URL
    Url,
    /// Dashboard refresh period in seconds
    RefreshSecs,
    /// Per-request timeout in seconds
    Timeout,
    /// Default device for history
    Device,
    /// Default history axis granularity
    Axis,
    /// Disable colored output
    NoColor,
}

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key
        #[arg(value_enum)]
        key: ConfigKey,
        /// Configuration value
        value: String,
    },

    /// Unset (remove) a configuration value
    Unset {
        /// Configuration key to remove
        #[arg(value_enum)]
        key: ConfigKey,
    },

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init,
}
