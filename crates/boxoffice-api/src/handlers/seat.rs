//! Seat listing, locking, and confirmation handlers.

use axum::Json;
use axum::extract::{Path, State};

use boxoffice_core::types::{HolderId, PoolStatus};

use crate::dto::request::{ConfirmSeatRequest, LockSeatRequest};
use crate::dto::response::{ApiResponse, SeatActionResponse, SeatListResponse, SeatResponse};
use crate::error::ApiError;
use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// GET /api/seats
pub async fn list_seats(State(state): State<AppState>) -> Json<SeatListResponse> {
    Json(SeatListResponse {
        success: true,
        seats: state.lease_manager.list(),
    })
}

/// GET /api/seats/{id}
pub async fn get_seat(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SeatResponse>, ApiError> {
    let seat = state.lease_manager.get(&id)?;
    Ok(Json(SeatResponse {
        success: true,
        seat,
    }))
}

/// POST /api/seats/lock
pub async fn lock_seat(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LockSeatRequest>,
) -> Result<Json<SeatActionResponse>, ApiError> {
    let holder = HolderId::new(req.user.as_str());
    let seat = state
        .lease_manager
        .acquire(&req.seat_id, &holder, req.ttl())?;

    Ok(Json(SeatActionResponse {
        success: true,
        message: format!("Seat {} locked for {}", seat.id, holder),
        seat,
    }))
}

/// POST /api/seats/confirm
pub async fn confirm_seat(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ConfirmSeatRequest>,
) -> Result<Json<SeatActionResponse>, ApiError> {
    let holder = HolderId::new(req.user);
    let seat = state.lease_manager.confirm(&req.seat_id, &holder)?;

    Ok(Json(SeatActionResponse {
        success: true,
        message: format!("Seat {} booked by {}", seat.id, holder),
        seat,
    }))
}

/// GET /api/pool
pub async fn pool_status(State(state): State<AppState>) -> Json<ApiResponse<PoolStatus>> {
    Json(ApiResponse::ok(state.lease_manager.pool_status()))
}
