//! Endpoint configuration surface.
//!
//! The endpoint can be changed at runtime (e.g. from a settings screen); every
//! classification request reads the current value.

use crate::error::{ConfigError, ConfigResult};
use parking_lot::RwLock;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Operation path of the classification endpoint
pub const PREDICT_SUFFIX: &str = "/predict";

/// Trim, drop one trailing slash and make sure the URL ends in `/predict`
pub fn normalize_endpoint(raw: &str) -> ConfigResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::invalid_endpoint(raw, "endpoint is empty"));
    }

    let base = trimmed.strip_suffix('/').unwrap_or(trimmed);
    let lower = base.to_ascii_lowercase();
    if !lower.starts_with("http://") && !lower.starts_with("https://") {
        return Err(ConfigError::invalid_endpoint(
            raw,
            "endpoint must start with http:// or https://",
        ));
    }

    let normalized = if base.ends_with(PREDICT_SUFFIX) {
        base.to_string()
    } else {
        format!("{}{}", base, PREDICT_SUFFIX)
    };

    Url::parse(&normalized).map_err(|e| ConfigError::invalid_endpoint(raw, e.to_string()))?;
    Ok(normalized)
}

/// Server root for connectivity checks: the endpoint without `/predict`
pub fn endpoint_root(raw: &str) -> ConfigResult<String> {
    let normalized = normalize_endpoint(raw)?;
    Ok(root_of(&normalized))
}

fn root_of(normalized: &str) -> String {
    let base = normalized.strip_suffix(PREDICT_SUFFIX).unwrap_or(normalized);
    format!("{}/", base)
}

pub fn default_settings_path() -> Option<PathBuf> {
    dirs_next::config_dir().map(|dir| dir.join("xray-lens").join("settings.json"))
}

#[derive(Debug, Serialize, Deserialize)]
struct SettingsFile {
    endpoint: String,
}

/// Shared handle to the current endpoint, optionally backed by a JSON file
#[derive(Debug, Clone)]
pub struct EndpointSettings {
    endpoint: Arc<RwLock<String>>,
    path: Option<Arc<PathBuf>>,
}

impl EndpointSettings {
    /// In-memory settings, nothing is persisted
    pub fn new(raw: &str) -> ConfigResult<Self> {
        Ok(Self {
            endpoint: Arc::new(RwLock::new(normalize_endpoint(raw)?)),
            path: None,
        })
    }

    /// Read the saved endpoint from `path`, or use `default` if nothing was saved yet
    pub fn load_or_default(path: impl Into<PathBuf>, default: &str) -> ConfigResult<Self> {
        let path = path.into();
        let endpoint = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            let file: SettingsFile = serde_json::from_str(&raw)?;
            tracing::debug!(path = %path.display(), "Loaded saved endpoint");
            normalize_endpoint(&file.endpoint)?
        } else {
            normalize_endpoint(default)?
        };

        Ok(Self {
            endpoint: Arc::new(RwLock::new(endpoint)),
            path: Some(Arc::new(path)),
        })
    }

    pub fn get(&self) -> String {
        self.endpoint.read().clone()
    }

    pub fn root(&self) -> String {
        root_of(&self.endpoint.read())
    }

    pub fn settings_path(&self) -> Option<&Path> {
        self.path.as_deref().map(PathBuf::as_path)
    }

    /// Normalize and store a new endpoint, persisting it first when file-backed.
    /// On error the previous value stays in place.
    pub fn set(&self, raw: &str) -> ConfigResult<String> {
        let normalized = normalize_endpoint(raw)?;

        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let body = serde_json::to_string_pretty(&SettingsFile {
                endpoint: normalized.clone(),
            })?;
            std::fs::write(path.as_path(), body)?;
        }

        *self.endpoint.write() = normalized.clone();
        tracing::info!(endpoint = %normalized, "Updated classification endpoint");
        Ok(normalized)
    }
}
