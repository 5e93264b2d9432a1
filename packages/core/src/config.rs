use crate::error::{ConfigError, ConfigResult};
use crate::resolver::DEFAULT_MIN_CONFIDENCE;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Runtime configuration for the identification service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XrayConfig {
    /// Classification endpoint used when no saved setting exists
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Deadline for one classification request (milliseconds)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Deadline for a connectivity probe (milliseconds)
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    /// TCP connect deadline for the HTTP client (milliseconds)
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Predictions below this confidence are skipped during resolution
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,
    /// Longest image edge sent to the backend, 0 uploads the original
    #[serde(default = "default_max_upload_edge")]
    pub max_upload_edge: u32,
    /// Where the endpoint setting is persisted
    #[serde(default)]
    pub settings_path: Option<PathBuf>,
}

fn default_endpoint() -> String {
    "http://localhost:8000/predict".to_string()
}
fn default_request_timeout_ms() -> u64 {
    5000
}
fn default_probe_timeout_ms() -> u64 {
    5000
}
fn default_connect_timeout_ms() -> u64 {
    3000
}
fn default_min_confidence() -> f32 {
    DEFAULT_MIN_CONFIDENCE
}
fn default_max_upload_edge() -> u32 {
    1024
}

impl Default for XrayConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            request_timeout_ms: default_request_timeout_ms(),
            probe_timeout_ms: default_probe_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            min_confidence: default_min_confidence(),
            max_upload_edge: default_max_upload_edge(),
            settings_path: None,
        }
    }
}

impl XrayConfig {
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source; unparseable values are rejected
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let config = Self {
            endpoint: lookup("XRAY_ENDPOINT").unwrap_or_else(default_endpoint),
            request_timeout_ms: parse_or(&lookup, "XRAY_REQUEST_TIMEOUT_MS", default_request_timeout_ms)?,
            probe_timeout_ms: parse_or(&lookup, "XRAY_PROBE_TIMEOUT_MS", default_probe_timeout_ms)?,
            connect_timeout_ms: parse_or(&lookup, "XRAY_CONNECT_TIMEOUT_MS", default_connect_timeout_ms)?,
            min_confidence: parse_or(&lookup, "XRAY_MIN_CONFIDENCE", default_min_confidence)?,
            max_upload_edge: parse_or(&lookup, "XRAY_MAX_UPLOAD_EDGE", default_max_upload_edge)?,
            settings_path: lookup("XRAY_SETTINGS_PATH").map(PathBuf::from),
        };

        if !(0.0..=1.0).contains(&config.min_confidence) {
            return Err(ConfigError::InvalidValue {
                key: "XRAY_MIN_CONFIDENCE".to_string(),
                value: config.min_confidence.to_string(),
            });
        }

        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn max_upload_edge(&self) -> Option<u32> {
        (self.max_upload_edge > 0).then_some(self.max_upload_edge)
    }

    /// Configured settings file, falling back to the per-user config dir
    pub fn settings_path(&self) -> Option<PathBuf> {
        self.settings_path
            .clone()
            .or_else(crate::settings::default_settings_path)
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: fn() -> T,
) -> ConfigResult<T> {
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw,
        }),
        None => Ok(default()),
    }
}
