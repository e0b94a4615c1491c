//! Domain events emitted by lease operations.
//!
//! Events are published on a broadcast channel by the lease manager and
//! the expiry reclaimer. Consumers that lag behind lose the oldest events.

pub mod seat;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::HolderId;

pub use seat::SeatEvent;

/// Wrapper for a seat event with metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainEvent {
    /// When the event occurred, per the service clock.
    pub timestamp: DateTime<Utc>,
    /// The holder who caused the event; `None` for passive expiry.
    pub actor: Option<HolderId>,
    /// The event payload.
    pub payload: SeatEvent,
}

impl DomainEvent {
    /// Create a new domain event.
    pub fn new(timestamp: DateTime<Utc>, actor: Option<HolderId>, payload: SeatEvent) -> Self {
        Self {
            timestamp,
            actor,
            payload,
        }
    }
}
