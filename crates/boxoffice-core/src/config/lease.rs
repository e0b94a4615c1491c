//! Seat inventory, lease, and reclaimer configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Seat inventory and lease timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseConfig {
    /// Prefix for generated seat identifiers.
    #[serde(default = "default_seat_prefix")]
    pub seat_prefix: String,
    /// Number of generated seats, numbered from 1.
    #[serde(default = "default_seat_count")]
    pub seat_count: u32,
    /// Explicit seat identifiers. When non-empty, replaces the generated set.
    #[serde(default)]
    pub seat_ids: Vec<String>,
    /// Lease TTL applied when the caller does not supply one.
    #[serde(default = "default_ttl")]
    pub default_ttl_seconds: u64,
    /// Upper bound on a caller-supplied TTL.
    #[serde(default = "default_max_ttl")]
    pub max_ttl_seconds: u64,
    /// Capacity of the lease event broadcast buffer.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl LeaseConfig {
    /// Seat identifiers in seeding order.
    pub fn seat_ids(&self) -> Vec<String> {
        if !self.seat_ids.is_empty() {
            return self.seat_ids.clone();
        }
        (1..=self.seat_count)
            .map(|n| format!("{}{n}", self.seat_prefix))
            .collect()
    }

    /// Default lease TTL.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_seconds)
    }

    /// Maximum caller-supplied lease TTL.
    pub fn max_ttl(&self) -> Duration {
        Duration::from_secs(self.max_ttl_seconds)
    }
}

impl Default for LeaseConfig {
    fn default() -> Self {
        Self {
            seat_prefix: default_seat_prefix(),
            seat_count: default_seat_count(),
            seat_ids: Vec::new(),
            default_ttl_seconds: default_ttl(),
            max_ttl_seconds: default_max_ttl(),
            event_buffer: default_event_buffer(),
        }
    }
}

/// Background expiry sweep configuration.
///
/// Lazy reclamation on access is always on; this controls the optional
/// active sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReclaimerConfig {
    /// Whether the background sweep runs.
    #[serde(default = "default_true")]
    pub active: bool,
    /// Interval between sweeps in milliseconds.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_ms: u64,
}

impl ReclaimerConfig {
    /// Interval between sweeps.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }
}

impl Default for ReclaimerConfig {
    fn default() -> Self {
        Self {
            active: true,
            sweep_interval_ms: default_sweep_interval(),
        }
    }
}

fn default_seat_prefix() -> String {
    "A".to_string()
}

fn default_seat_count() -> u32 {
    10
}

fn default_ttl() -> u64 {
    60
}

fn default_max_ttl() -> u64 {
    3600
}

fn default_event_buffer() -> usize {
    256
}

fn default_true() -> bool {
    true
}

fn default_sweep_interval() -> u64 {
    1000
}
