//! Response DTOs.

use serde::{Deserialize, Serialize};

use boxoffice_core::error::ConflictReason;
use boxoffice_core::types::Seat;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// `GET /api/seats` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatListResponse {
    /// Always `true`.
    pub success: bool,
    /// Seats in seeding order.
    pub seats: Vec<Seat>,
}

/// Single-seat response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatResponse {
    /// Always `true`.
    pub success: bool,
    /// The seat.
    pub seat: Seat,
}

/// Response to a lock or confirm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatActionResponse {
    /// Always `true`.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
    /// The seat after the operation.
    pub seat: Seat,
}

/// Health check body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"ok"` while serving.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Seconds since startup.
    pub uptime_seconds: u64,
}

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// Machine-readable error code.
    pub error: String,
    /// Conflict sub-kind, for `CONFLICT` errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ConflictReason>,
    /// Whether retrying later may succeed.
    pub retryable: bool,
    /// Human-readable message.
    pub message: String,
}
