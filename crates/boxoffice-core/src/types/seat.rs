//! The seat model: one tagged variant per lease state.
//!
//! Fields that only make sense in one state live inside that variant, so a
//! seat that is not `Held` cannot carry a holder or a lease deadline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{HolderId, SeatId};

/// Stored lease state of a seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SeatState {
    /// Free to be acquired.
    Available,
    /// Exclusively leased to `holder` until `lease_deadline`.
    Held {
        /// Current lease owner.
        holder: HolderId,
        /// Instant after which the lease has lapsed.
        #[serde(rename = "leaseDeadline")]
        lease_deadline: DateTime<Utc>,
    },
    /// Booked. Terminal.
    Committed {
        /// Holder whose lease was confirmed.
        #[serde(rename = "committedBy")]
        committed_by: HolderId,
        /// When the confirmation happened.
        #[serde(rename = "committedAt")]
        committed_at: DateTime<Utc>,
    },
}

impl SeatState {
    /// Returns the state tag without its fields.
    pub fn status(&self) -> SeatStatus {
        match self {
            Self::Available => SeatStatus::Available,
            Self::Held { .. } => SeatStatus::Held,
            Self::Committed { .. } => SeatStatus::Committed,
        }
    }

    /// Returns the lease holder if the seat is held.
    pub fn holder(&self) -> Option<&HolderId> {
        match self {
            Self::Held { holder, .. } => Some(holder),
            _ => None,
        }
    }

    /// Returns the lease deadline if the seat is held.
    pub fn lease_deadline(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Held { lease_deadline, .. } => Some(*lease_deadline),
            _ => None,
        }
    }
}

/// State tag of a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatStatus {
    /// See [`SeatState::Available`].
    Available,
    /// See [`SeatState::Held`].
    Held,
    /// See [`SeatState::Committed`].
    Committed,
}

impl std::fmt::Display for SeatStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available => write!(f, "available"),
            Self::Held => write!(f, "held"),
            Self::Committed => write!(f, "committed"),
        }
    }
}

/// A point-in-time snapshot of one seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    /// Stable seat identifier.
    pub id: SeatId,
    /// Lease state.
    #[serde(flatten)]
    pub state: SeatState,
}

impl Seat {
    /// Creates an available seat.
    pub fn available(id: SeatId) -> Self {
        Self {
            id,
            state: SeatState::Available,
        }
    }
}

/// Seat counts by state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStatus {
    /// Total seats in the registry.
    pub total: u32,
    /// Seats free to acquire.
    pub available: u32,
    /// Seats under a live lease.
    pub held: u32,
    /// Booked seats.
    pub committed: u32,
}

impl PoolStatus {
    /// Tallies a sequence of seats.
    pub fn tally<'a>(seats: impl IntoIterator<Item = &'a Seat>) -> Self {
        seats.into_iter().fold(Self::default(), |mut acc, seat| {
            acc.total += 1;
            match seat.state.status() {
                SeatStatus::Available => acc.available += 1,
                SeatStatus::Held => acc.held += 1,
                SeatStatus::Committed => acc.committed += 1,
            }
            acc
        })
    }
}
