//! Lease policy: pure decisions over a seat state and the current time.
//!
//! A `Held` seat whose deadline has passed is effectively `Available` even
//! before the registry rewrites it. Every decision goes through the
//! effective state, never the raw stored one.

use chrono::{DateTime, Utc};

use boxoffice_core::error::ConflictReason;
use boxoffice_core::types::{HolderId, SeatState, SeatStatus};

/// Whether `state` is a lease whose deadline has passed at `now`.
///
/// The deadline instant itself still belongs to the lease.
pub fn is_lapsed(state: &SeatState, now: DateTime<Utc>) -> bool {
    matches!(state, SeatState::Held { lease_deadline, .. } if now > *lease_deadline)
}

/// State the seat logically has at `now`.
pub fn effective_status(state: &SeatState, now: DateTime<Utc>) -> SeatStatus {
    if is_lapsed(state, now) {
        SeatStatus::Available
    } else {
        state.status()
    }
}

/// Decides whether a new lease may be granted on a seat in `state`.
pub fn check_acquire(state: &SeatState, now: DateTime<Utc>) -> Result<(), ConflictReason> {
    match effective_status(state, now) {
        SeatStatus::Available => Ok(()),
        SeatStatus::Held => Err(ConflictReason::AlreadyHeld),
        SeatStatus::Committed => Err(ConflictReason::AlreadyCommitted),
    }
}

/// Decides whether `holder` may confirm a seat in `state`.
pub fn check_confirm(
    state: &SeatState,
    holder: &HolderId,
    now: DateTime<Utc>,
) -> Result<(), ConflictReason> {
    match effective_status(state, now) {
        SeatStatus::Available => Err(ConflictReason::Expired),
        SeatStatus::Committed => Err(ConflictReason::AlreadyCommitted),
        SeatStatus::Held if state.holder() == Some(holder) => Ok(()),
        SeatStatus::Held => Err(ConflictReason::NotHolder),
    }
}
