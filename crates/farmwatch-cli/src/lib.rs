//! Command-line dashboard and controls for farmwatch sensors.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `devices` | Show the current state of every device |
//! | `dashboard` | Refresh the device list periodically |
//! | `interval` | Change a device's reporting interval |
//! | `relay` | Switch a device's relay on or off |
//! | `relay-info` | Show the relay registered for a device |
//! | `history` | Show a device's reading history as a text chart, JSON or CSV |
//! | `config` | Manage CLI configuration |
//! | `completions` | Generate shell completions |
//!
//! # Configuration
//!
//! The CLI stores configuration in `~/.config/farmwatch/config.toml` (or
//! platform equivalent):
//!
//! - `base_url`: Backend URL (default `http://127.0.0.1:3000`)
//! - `refresh_secs`: Dashboard refresh period (default 60)
//! - `request_timeout_secs`: Per-request timeout (default 10)
//! - `device`: Default device for `history`
//! - `axis`: Default history axis granularity (`auto`, `hour-1`, ...)
//! - `no_color`: Disable colored output
//!
//! # Environment Variables
//!
//! - `FARMWATCH_URL`: Backend URL (overridden by `--url`)
//! - `FARMWATCH_DEVICE`: Default device for `history`
//! - `NO_COLOR`: Disable colored output when set
//! - `FARMWATCH_STYLE`: Table style (`rich` or `plain`, overridden by `--style`)
//!
//! # Examples
//!
//! ```bash
//! farmwatch devices
//! farmwatch dashboard --interval 30
//! farmwatch interval sensor-001 900
//! farmwatch relay sensor-001 on
//! farmwatch history sensor-001 --axis hour-1
//! ```

pub mod chart;
pub mod cli;
pub mod commands;
pub mod config;
pub mod format;
pub mod style;
pub mod util;

// Re-export core dependencies for convenience
pub use farmwatch_core;
pub use farmwatch_types;
