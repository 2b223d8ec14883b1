use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::infrastructure::record::DEFAULT_KEY;

/// Browser local storage is typically capped at 5 MiB per origin.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} has invalid value `{value}`: {reason}")]
    Invalid { var: &'static str, value: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub storage_key: String,
    /// `None` disables the quota.
    pub quota_bytes: Option<usize>,
    pub addr: SocketAddr,
    pub assets_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            storage_key: DEFAULT_KEY.to_string(),
            quota_bytes: Some(DEFAULT_QUOTA_BYTES),
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            assets_dir: PathBuf::from("public"),
        }
    }
}

impl Settings {
    /// Reads `TASKLIST_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut settings = Self::default();
        if let Some(dir) = lookup("TASKLIST_DATA_DIR") {
            settings.data_dir = PathBuf::from(dir);
        }
        if let Some(key) = lookup("TASKLIST_STORAGE_KEY") {
            if key.trim().is_empty() {
                return Err(ConfigError::Invalid { var: "TASKLIST_STORAGE_KEY", value: key, reason: "must not be empty".into() });
            }
            settings.storage_key = key;
        }
        if let Some(raw) = lookup("TASKLIST_QUOTA_BYTES") {
            let quota: usize = raw
                .trim()
                .parse()
                .map_err(|e: std::num::ParseIntError| ConfigError::Invalid { var: "TASKLIST_QUOTA_BYTES", value: raw.clone(), reason: e.to_string() })?;
            settings.quota_bytes = (quota > 0).then_some(quota);
        }
        if let Some(raw) = lookup("TASKLIST_ADDR") {
            settings.addr = raw
                .trim()
                .parse()
                .map_err(|e: std::net::AddrParseError| ConfigError::Invalid { var: "TASKLIST_ADDR", value: raw.clone(), reason: e.to_string() })?;
        }
        if let Some(dir) = lookup("TASKLIST_ASSETS_DIR") {
            settings.assets_dir = PathBuf::from(dir);
        }
        Ok(settings)
    }
}
