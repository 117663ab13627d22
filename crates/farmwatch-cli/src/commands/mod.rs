//! Command implementations for the CLI.

mod config;
mod dashboard;
mod devices;
mod history;
mod interval;
mod relay;

pub use config::cmd_config;
pub use dashboard::{DashboardArgs, cmd_dashboard};
pub use devices::cmd_devices;
pub use history::{HistoryArgs, cmd_history};
pub use interval::cmd_interval;
pub use relay::{cmd_relay, cmd_relay_info};
