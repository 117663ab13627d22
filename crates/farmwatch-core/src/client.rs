//! HTTP client for the reading store and control plane.
//!
//! This module provides [`StoreClient`], which talks to the backend REST API:
//! listing readings, interval settings and relay addresses, fetching one
//! device's history, and forwarding interval/relay commands.
//!
//! Field naming on the backend is inconsistent between endpoints; the client
//! normalizes interval and relay records into domain types on the way in and
//! drops malformed ones with a warning. Readings are returned as raw
//! [`ReadingRecord`]s because timestamp validation belongs to the reducer.
//!
//! # Example
//!
//! ```no_run
//! use farmwatch_core::client::StoreClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = StoreClient::new("http://127.0.0.1:3000")?;
//!
//! let readings = client.readings().await?;
//! println!("{} readings stored", readings.len());
//!
//! client.set_relay("sensor-001", "on".parse()?).await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use farmwatch_types::{
    IntervalRecord, IntervalSetting, ParseError, ReadingRecord, RelayAction, RelayAddress,
    RelayRecord, SetIntervalRequest,
};

use crate::error::{Error, Result};
use crate::traits::{ControlPlane, TelemetrySource};

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the farmwatch backend API.
#[derive(Debug, Clone)]
pub struct StoreClient {
    client: Client,
    base_url: String,
}

impl StoreClient {
    /// Create a new client with the default request timeout.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Backend root URL (e.g., "http://127.0.0.1:3000")
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a new client with a custom request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        if timeout.is_zero() {
            return Err(Error::invalid_config("request timeout must be > 0"));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(Error::Http)?;
        Self::with_client(base_url, client)
    }

    /// Create a client with a custom reqwest Client.
    pub fn with_client(base_url: &str, client: Client) -> Result<Self> {
        // Normalize URL (remove trailing slash)
        let base_url = base_url.trim().trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::InvalidUrl(format!(
                "URL must start with http:// or https://, got: {}",
                base_url
            )));
        }
        Url::parse(&base_url).map_err(|e| Error::InvalidUrl(format!("{}: {}", base_url, e)))?;

        Ok(Self { client, base_url })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /api/v1/data`: every stored reading.
    pub async fn readings(&self) -> Result<Vec<ReadingRecord>> {
        let url = self.endpoint(&["data"])?;
        self.get(url).await
    }

    /// `GET /api/v1/data/device/{deviceId}`: one device's readings.
    pub async fn device_history(&self, device_id: &str) -> Result<Vec<ReadingRecord>> {
        let url = self.endpoint(&["data", "device", device_id])?;
        self.get(url).await
    }

    /// `GET /api/v1/intervals`: every stored interval setting.
    pub async fn intervals(&self) -> Result<Vec<IntervalSetting>> {
        let url = self.endpoint(&["intervals"])?;
        let records: Vec<IntervalRecord> = self.get(url).await?;
        Ok(normalize(&records, "interval"))
    }

    /// `GET /api/v1/relays`: every registered relay address.
    pub async fn relays(&self) -> Result<Vec<RelayAddress>> {
        let url = self.endpoint(&["relays"])?;
        let records: Vec<RelayRecord> = self.get(url).await?;
        Ok(normalize(&records, "relay"))
    }

    /// `GET /api/v1/relay/{deviceId}`: the relay registered for one device.
    ///
    /// Returns `Ok(None)` when the backend has no relay for the device.
    pub async fn relay(&self, device_id: &str) -> Result<Option<RelayAddress>> {
        let url = self.endpoint(&["relay", device_id])?;
        let response = self.send(self.client.get(url.clone()), &url).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let record: RelayRecord = self.handle_response(response).await?;
        Ok(Some(RelayAddress::try_from(&record)?))
    }

    /// `POST /api/v1/interval`.
    ///
    /// This does not check the allowed interval set; use
    /// [`ControlDispatcher`](crate::dispatcher::ControlDispatcher) for that.
    pub async fn set_interval(&self, device_id: &str, interval_seconds: u32) -> Result<()> {
        let url = self.endpoint(&["interval"])?;
        let body = SetIntervalRequest {
            device_id: device_id.to_string(),
            interval_seconds,
        };
        let response = self.send(self.client.post(url.clone()).json(&body), &url).await?;
        command_outcome(response).await
    }

    /// `POST /api/v1/relay/{deviceId}/{action}`.
    pub async fn set_relay(&self, device_id: &str, action: RelayAction) -> Result<()> {
        let url = self.endpoint(&["relay", device_id, action.as_str()])?;
        let response = self.send(self.client.post(url.clone()), &url).await?;
        command_outcome(response).await
    }

    // ======================================================================
    // Internal HTTP helpers
    // ======================================================================

    /// Build `{base}/api/v1/{segments...}` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "v1"])
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder, url: &Url) -> Result<reqwest::Response> {
        debug!(url = %url, "Sending request");
        request.send().await.map_err(|e| Error::Unreachable {
            url: url.to_string(),
            source: e,
        })
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self.send(self.client.get(url.clone()), &url).await?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            response.json().await.map_err(Error::Http)
        } else {
            let message = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or_else(|| status.to_string());

            Err(Error::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Map a command response to accept/reject, keeping the body text verbatim.
async fn command_outcome(response: reqwest::Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    let reason = if body.trim().is_empty() {
        status
            .canonical_reason()
            .map(String::from)
            .unwrap_or_else(|| status.to_string())
    } else {
        body
    };
    Err(Error::rejected(status.as_u16(), reason))
}

/// Convert wire records, dropping (and logging) the malformed ones.
fn normalize<R, T>(records: &[R], kind: &str) -> Vec<T>
where
    for<'a> T: TryFrom<&'a R, Error = ParseError>,
{
    records
        .iter()
        .filter_map(|record| match T::try_from(record) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Skipping malformed {} record: {}", kind, e);
                None
            }
        })
        .collect()
}

#[async_trait]
impl TelemetrySource for StoreClient {
    async fn fetch_readings(&self) -> Result<Vec<ReadingRecord>> {
        self.readings().await
    }

    async fn fetch_history(&self, device_id: &str) -> Result<Vec<ReadingRecord>> {
        self.device_history(device_id).await
    }

    async fn fetch_intervals(&self) -> Result<Vec<IntervalSetting>> {
        self.intervals().await
    }

    async fn fetch_relays(&self) -> Result<Vec<RelayAddress>> {
        self.relays().await
    }
}

#[async_trait]
impl ControlPlane for StoreClient {
    async fn send_interval(&self, device_id: &str, interval_seconds: u32) -> Result<()> {
        self.set_interval(device_id, interval_seconds).await
    }

    async fn send_relay(&self, device_id: &str, action: RelayAction) -> Result<()> {
        self.set_relay(device_id, action).await
    }
}
