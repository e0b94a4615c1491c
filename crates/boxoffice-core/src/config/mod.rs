//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Every field has a default, so an empty source yields a
//! working ten-seat configuration.

pub mod app;
pub mod lease;
pub mod logging;

use std::collections::HashSet;

use chrono::{TimeDelta, Utc};
use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::lease::{LeaseConfig, ReclaimerConfig};
pub use self::logging::LoggingConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Seat inventory and lease settings.
    #[serde(default)]
    pub lease: LeaseConfig,
    /// Background expiry sweep settings.
    #[serde(default)]
    pub reclaimer: ReclaimerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `{dir}/default.toml` with an environment-specific overlay
    /// `{dir}/{env}.toml` and environment variables prefixed with
    /// `BOXOFFICE__` (e.g. `BOXOFFICE__LEASE__SEAT_COUNT=20`). Missing files
    /// are skipped.
    pub fn load(dir: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("BOXOFFICE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let parsed: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(toml: &str) -> Result<Self, AppError> {
        let parsed: Self = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Reject configurations the lease engine cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        let ids = self.lease.seat_ids();
        if ids.is_empty() {
            return Err(AppError::configuration("lease.seat_count must be at least 1"));
        }
        let mut seen = HashSet::with_capacity(ids.len());
        for id in &ids {
            if id.trim().is_empty() {
                return Err(AppError::configuration("lease.seat_ids contains an empty id"));
            }
            if !seen.insert(id.as_str()) {
                return Err(AppError::configuration(format!(
                    "lease.seat_ids contains duplicate id '{id}'"
                )));
            }
        }
        if self.lease.default_ttl_seconds == 0 {
            return Err(AppError::configuration(
                "lease.default_ttl_seconds must be at least 1",
            ));
        }
        if self.lease.default_ttl_seconds > self.lease.max_ttl_seconds {
            return Err(AppError::configuration(format!(
                "lease.default_ttl_seconds ({}) exceeds lease.max_ttl_seconds ({})",
                self.lease.default_ttl_seconds, self.lease.max_ttl_seconds
            )));
        }
        let max_deadline = i64::try_from(self.lease.max_ttl_seconds)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl));
        if max_deadline.is_none() {
            return Err(AppError::configuration(format!(
                "lease.max_ttl_seconds ({}) is too large to schedule a deadline",
                self.lease.max_ttl_seconds
            )));
        }
        if self.lease.event_buffer == 0 {
            return Err(AppError::configuration("lease.event_buffer must be at least 1"));
        }
        if self.reclaimer.active && self.reclaimer.sweep_interval_ms == 0 {
            return Err(AppError::configuration(
                "reclaimer.sweep_interval_ms must be at least 1",
            ));
        }
        Ok(())
    }
}
