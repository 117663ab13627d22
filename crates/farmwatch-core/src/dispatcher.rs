//! Control command dispatch.
//!
//! [`ControlDispatcher`] validates commands locally and forwards them to a
//! [`ControlPlane`]. It keeps no state of its own: an accepted command shows
//! up in the dashboard only once the next refresh picks it up from the store.

use tracing::{info, warn};

use farmwatch_types::{ControlCommand, RelayAction, ReportInterval};

use crate::error::{Error, Result};
use crate::traits::ControlPlane;

/// Sends interval and relay commands to the control plane.
///
/// # Example
///
/// ```
/// use farmwatch_core::{ControlDispatcher, Error, MockStore};
///
/// #[tokio::main]
/// async fn main() {
///     let dispatcher = ControlDispatcher::new(MockStore::new());
///
///     dispatcher.set_interval("sensor-001", 900).await.unwrap();
///     assert!(matches!(
///         dispatcher.set_interval("sensor-001", 120).await,
///         Err(Error::InvalidInterval(120))
///     ));
/// }
/// ```
#[derive(Debug)]
pub struct ControlDispatcher<C> {
    control: C,
}

impl<C: ControlPlane> ControlDispatcher<C> {
    pub fn new(control: C) -> Self {
        Self { control }
    }

    /// The underlying control plane.
    pub fn control_plane(&self) -> &C {
        &self.control
    }

    /// Change a device's reporting interval.
    ///
    /// `interval_seconds` must be one of 60, 300, 900, 1800 or 3600; anything
    /// else fails with [`Error::InvalidInterval`] before a request is made.
    pub async fn set_interval(&self, device_id: &str, interval_seconds: u32) -> Result<()> {
        check_device_id(device_id)?;
        let interval = ReportInterval::from_seconds(interval_seconds)
            .ok_or(Error::InvalidInterval(interval_seconds))?;

        let result = self
            .control
            .send_interval(device_id, interval.as_seconds())
            .await;
        log_outcome(device_id, &format!("interval {}", interval), &result);
        result
    }

    /// Switch a device's relay on or off.
    pub async fn set_relay(&self, device_id: &str, action: RelayAction) -> Result<()> {
        check_device_id(device_id)?;

        let result = self.control.send_relay(device_id, action).await;
        log_outcome(device_id, &format!("relay {}", action), &result);
        result
    }

    /// Route a command value to [`set_interval`](Self::set_interval) or
    /// [`set_relay`](Self::set_relay).
    pub async fn dispatch(&self, command: &ControlCommand) -> Result<()> {
        match command {
            ControlCommand::SetInterval {
                device_id,
                interval_seconds,
            } => self.set_interval(device_id, *interval_seconds).await,
            ControlCommand::SetRelay { device_id, action } => {
                self.set_relay(device_id, *action).await
            }
        }
    }
}

fn check_device_id(device_id: &str) -> Result<()> {
    if device_id.trim().is_empty() {
        return Err(Error::invalid_config("device id must not be empty"));
    }
    Ok(())
}

fn log_outcome(device_id: &str, what: &str, result: &Result<()>) {
    match result {
        Ok(()) => info!(device_id, "Command accepted: {}", what),
        Err(e) => warn!(device_id, "Command failed: {}: {}", what, e),
    }
}
