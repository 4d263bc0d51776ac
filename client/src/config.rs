//! Configuration for a sync session.

use chrono::Duration;
use nightsync_engine::DEFAULT_PROPAGATION_DELAY_SECS;
use std::env;

/// Default number of records requested per fetch (one day of 5-minute readings).
pub const DEFAULT_PAGE_SIZE: usize = 288;

/// Sync configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// How long the remote read path may lag behind writes
    pub propagation_delay: Duration,
    /// Records requested per fetch
    pub page_size: usize,
    /// Surface uploads newer than the fetched batch when showing "up to now"
    pub insert_all_newer_uploads: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            propagation_delay: Duration::seconds(DEFAULT_PROPAGATION_DELAY_SECS),
            page_size: DEFAULT_PAGE_SIZE,
            insert_all_newer_uploads: true,
        }
    }
}

impl SyncConfig {
    /// Load configuration from a `.env` file, if present, and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let propagation_delay = match var("NIGHTSYNC_PROPAGATION_DELAY_SECS") {
            Some(raw) => {
                let secs: i64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidPropagationDelay(raw.clone()))?;
                Duration::try_seconds(secs)
                    .filter(|_| secs >= 0)
                    .ok_or(ConfigError::InvalidPropagationDelay(raw))?
            }
            None => defaults.propagation_delay,
        };

        let page_size = match var("NIGHTSYNC_PAGE_SIZE") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => return Err(ConfigError::InvalidPageSize(raw)),
            },
            None => defaults.page_size,
        };

        let insert_all_newer_uploads = match var("NIGHTSYNC_INSERT_ALL_NEWER_UPLOADS") {
            Some(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidFlag(raw))?,
            None => defaults.insert_all_newer_uploads,
        };

        Ok(Self {
            propagation_delay,
            page_size,
            insert_all_newer_uploads,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid NIGHTSYNC_PROPAGATION_DELAY_SECS value: {0}")]
    InvalidPropagationDelay(String),

    #[error("Invalid NIGHTSYNC_PAGE_SIZE value: {0}")]
    InvalidPageSize(String),

    #[error("Invalid NIGHTSYNC_INSERT_ALL_NEWER_UPLOADS value: {0}")]
    InvalidFlag(String),
}
