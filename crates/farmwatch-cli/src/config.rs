//! Configuration file management.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use farmwatch_core::{DEFAULT_REFRESH_PERIOD, DEFAULT_REQUEST_TIMEOUT};
use farmwatch_types::AxisGranularity;
use serde::{Deserialize, Serialize};

use crate::cli::ConfigKey;

/// Backend URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";

/// Configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Backend base URL
    #[serde(default)]
    pub base_url: Option<String>,

    /// Dashboard refresh period in seconds
    #[serde(default)]
    pub refresh_secs: Option<u64>,

    /// Per-request timeout in seconds
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Default device for history
    #[serde(default)]
    pub device: Option<String>,

    /// Default history axis granularity ("auto" or unit-step)
    #[serde(default)]
    pub axis: Option<String>,

    /// Disable colored output
    #[serde(default)]
    pub no_color: bool,
}

impl Config {
    /// Get the config file path
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("farmwatch")
            .join("config.toml")
    }

    /// Load config from the default path, or return default if not found
    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    /// Load config from `path`, or return default if missing or unreadable
    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        eprintln!("Warning: Failed to parse config: {}", e);
                    }
                },
                Err(e) => {
                    eprintln!("Warning: Failed to read config: {}", e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path())
    }

    /// Save config to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Config with every default spelled out, for `config init`.
    pub fn initial() -> Self {
        Self {
            base_url: Some(DEFAULT_BASE_URL.to_string()),
            refresh_secs: Some(DEFAULT_REFRESH_PERIOD.as_secs()),
            request_timeout_secs: Some(DEFAULT_REQUEST_TIMEOUT.as_secs()),
            device: None,
            axis: Some(AxisGranularity::Auto.to_string()),
            no_color: false,
        }
    }

    /// Set a key from its string form, validating the value.
    pub fn set(&mut self, key: ConfigKey, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            ConfigKey::Url => {
                if !value.starts_with("http://") && !value.starts_with("https://") {
                    bail!("URL must start with http:// or https://, got: {}", value);
                }
                self.base_url = Some(value.to_string());
            }
            ConfigKey::RefreshSecs => self.refresh_secs = Some(parse_secs(value)?),
            ConfigKey::Timeout => self.request_timeout_secs = Some(parse_secs(value)?),
            ConfigKey::Device => {
                if value.is_empty() {
                    bail!("Device must not be empty");
                }
                self.device = Some(value.to_string());
            }
            ConfigKey::Axis => {
                let axis: AxisGranularity = value
                    .parse()
                    .with_context(|| format!("Invalid axis '{}'", value))?;
                self.axis = Some(axis.to_string());
            }
            ConfigKey::NoColor => self.no_color = parse_bool(value)?,
        }
        Ok(())
    }

    /// Remove a key, falling back to its default.
    pub fn unset(&mut self, key: ConfigKey) {
        match key {
            ConfigKey::Url => self.base_url = None,
            ConfigKey::RefreshSecs => self.refresh_secs = None,
            ConfigKey::Timeout => self.request_timeout_secs = None,
            ConfigKey::Device => self.device = None,
            ConfigKey::Axis => self.axis = None,
            ConfigKey::NoColor => self.no_color = false,
        }
    }

    /// Effective dashboard refresh period.
    pub fn refresh_period(&self) -> Duration {
        self.refresh_secs
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REFRESH_PERIOD)
    }

    /// Effective per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout_secs
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT)
    }
}

fn parse_secs(value: &str) -> Result<u64> {
    let secs: u64 = value
        .parse()
        .with_context(|| format!("'{}' is not a valid number of seconds", value))?;
    if secs == 0 {
        bail!("Value must be greater than 0");
    }
    Ok(secs)
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => bail!(
            "Invalid boolean value '{}'. Use: true/false, yes/no, on/off, 1/0",
            value
        ),
    }
}

/// Resolve the backend URL: flag (or FARMWATCH_URL), then config, then default.
pub fn resolve_base_url(flag: Option<&str>, config: &Config) -> String {
    flag.map(str::to_string)
        .or_else(|| config.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

/// Resolve device from arg (or FARMWATCH_DEVICE), then config.
pub fn resolve_device(device: Option<String>, config: &Config) -> Option<String> {
    device
        .filter(|d| !d.trim().is_empty())
        .or_else(|| config.device.clone())
}

/// Resolve axis granularity from arg, then config, then automatic.
pub fn resolve_axis(axis: Option<AxisGranularity>, config: &Config) -> Result<AxisGranularity> {
    if let Some(axis) = axis {
        return Ok(axis);
    }
    match config.axis.as_deref() {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("Invalid axis '{}' in config", raw)),
        None => Ok(AxisGranularity::Auto),
    }
}

/// Resolve refresh period: explicit seconds override config.
pub fn resolve_refresh(interval: Option<u64>, config: &Config) -> Duration {
    interval
        .filter(|s| *s > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.refresh_period())
}

#[cfg(test)]
mod tests {
    use super::*;
    use farmwatch_types::TimeUnit;

    #[test]
    fn test_resolve_base_url_prefers_flag() {
        let config = Config {
            base_url: Some("http://config:3000".to_string()),
            ..Default::default()
        };
        assert_eq!(
            resolve_base_url(Some("http://flag:3000"), &config),
            "http://flag:3000"
        );
        assert_eq!(resolve_base_url(None, &config), "http://config:3000");
        assert_eq!(resolve_base_url(None, &Config::default()), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_resolve_device_falls_back_to_config() {
        let config = Config {
            device: Some("config-device".to_string()),
            ..Default::default()
        };
        assert_eq!(
            resolve_device(Some("arg-device".to_string()), &config),
            Some("arg-device".to_string())
        );
        assert_eq!(
            resolve_device(None, &config),
            Some("config-device".to_string())
        );
        assert_eq!(
            resolve_device(Some("  ".to_string()), &config),
            Some("config-device".to_string())
        );
        assert_eq!(resolve_device(None, &Config::default()), None);
    }

    #[test]
    fn test_resolve_axis() {
        let config = Config {
            axis: Some("day-1".to_string()),
            ..Default::default()
        };
        assert_eq!(
            resolve_axis(None, &config).unwrap(),
            AxisGranularity::Fixed {
                unit: TimeUnit::Day,
                step: 1
            }
        );
        assert_eq!(
            resolve_axis(Some(AxisGranularity::Auto), &config).unwrap(),
            AxisGranularity::Auto
        );
        assert_eq!(
            resolve_axis(None, &Config::default()).unwrap(),
            AxisGranularity::Auto
        );

        let broken = Config {
            axis: Some("fortnight".to_string()),
            ..Default::default()
        };
        assert!(resolve_axis(None, &broken).is_err());
    }

    #[test]
    fn test_durations_default_and_ignore_zero() {
        let config = Config::default();
        assert_eq!(config.refresh_period(), Duration::from_secs(60));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));

        let zeroed = Config {
            refresh_secs: Some(0),
            request_timeout_secs: Some(0),
            ..Default::default()
        };
        assert_eq!(zeroed.refresh_period(), Duration::from_secs(60));
        assert_eq!(zeroed.request_timeout(), Duration::from_secs(10));

        assert_eq!(resolve_refresh(Some(15), &config), Duration::from_secs(15));
        assert_eq!(resolve_refresh(None, &config), Duration::from_secs(60));
    }

    #[test]
    fn test_set_and_unset_keys() {
        let mut config = Config::default();
        config.set(ConfigKey::Url, "http://farm.local").unwrap();
        config.set(ConfigKey::RefreshSecs, "30").unwrap();
        config.set(ConfigKey::Axis, "HOUR-2").unwrap();
        config.set(ConfigKey::NoColor, "yes").unwrap();

        assert_eq!(config.base_url.as_deref(), Some("http://farm.local"));
        assert_eq!(config.refresh_secs, Some(30));
        assert_eq!(config.axis.as_deref(), Some("hour-2"));
        assert!(config.no_color);

        assert!(config.set(ConfigKey::Url, "farm.local").is_err());
        assert!(config.set(ConfigKey::Timeout, "0").is_err());
        assert!(config.set(ConfigKey::Axis, "week-1").is_err());

        config.unset(ConfigKey::RefreshSecs);
        config.unset(ConfigKey::NoColor);
        assert_eq!(config.refresh_secs, None);
        assert!(!config.no_color);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config {
            device: Some("sensor-001".to_string()),
            ..Config::initial()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path);
        assert_eq!(loaded, config);
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("base_url = \"http://127.0.0.1:3000\""));
    }

    #[test]
    fn test_load_missing_or_broken_file_gives_default() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert_eq!(Config::load_from(&missing), Config::default());

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "refresh_secs = \"soon\"").unwrap();
        assert_eq!(Config::load_from(&broken), Config::default());
    }
}
