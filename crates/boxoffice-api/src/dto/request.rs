//! Request DTOs with validation.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// `POST /api/seats/lock` body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LockSeatRequest {
    /// Seat to lock.
    #[serde(default)]
    #[validate(length(min = 1, message = "seatId is required"))]
    pub seat_id: String,
    /// Caller identity, trusted as given.
    #[serde(default)]
    #[validate(length(min = 1, message = "user is required"))]
    pub user: String,
    /// Lease TTL override in seconds.
    #[validate(range(min = 1, message = "ttlSeconds must be at least 1"))]
    pub ttl_seconds: Option<u64>,
}

impl LockSeatRequest {
    /// Requested TTL, if any.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_seconds.map(Duration::from_secs)
    }
}

/// `POST /api/seats/confirm` body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmSeatRequest {
    /// Seat to confirm.
    #[serde(default)]
    #[validate(length(min = 1, message = "seatId is required"))]
    pub seat_id: String,
    /// Caller identity; must match the lease holder.
    #[serde(default)]
    #[validate(length(min = 1, message = "user is required"))]
    pub user: String,
}
