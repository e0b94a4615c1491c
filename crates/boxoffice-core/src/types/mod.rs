//! Shared domain types: identifiers and the seat model.

pub mod id;
pub mod seat;

pub use id::{HolderId, SeatId};
pub use seat::{PoolStatus, Seat, SeatState, SeatStatus};
