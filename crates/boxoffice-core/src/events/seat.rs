//! Seat lease events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{HolderId, SeatId};

/// Events related to seat leases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SeatEvent {
    /// A lease was granted.
    Held {
        /// The seat.
        seat_id: SeatId,
        /// The new lease holder.
        holder: HolderId,
        /// When the lease lapses.
        lease_deadline: DateTime<Utc>,
    },
    /// A lease was confirmed and the seat booked.
    Committed {
        /// The seat.
        seat_id: SeatId,
        /// The holder that confirmed.
        holder: HolderId,
    },
    /// A lapsed lease was reclaimed.
    Expired {
        /// The seat, now available again.
        seat_id: SeatId,
        /// The holder whose lease lapsed.
        holder: HolderId,
    },
}

impl SeatEvent {
    /// The seat this event concerns.
    pub fn seat_id(&self) -> &SeatId {
        match self {
            Self::Held { seat_id, .. }
            | Self::Committed { seat_id, .. }
            | Self::Expired { seat_id, .. } => seat_id,
        }
    }
}
