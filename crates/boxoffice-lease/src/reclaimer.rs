//! Expiry reclaimer: returns lapsed leases to the pool.
//!
//! Reclamation happens lazily, on every access through the lease manager,
//! and optionally actively, from a background sweep driven by [`ExpiryReclaimer::run`].
//! Both paths go through the same registry primitive and publish the same
//! [`SeatEvent::Expired`] events, from inside the registry's critical
//! section.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use boxoffice_core::events::{DomainEvent, SeatEvent};
use boxoffice_core::result::AppResult;
use boxoffice_core::types::Seat;

use crate::clock::Clock;
use crate::registry::{ReclaimedLease, SeatRegistry};

/// Reclaims lapsed leases in a [`SeatRegistry`].
#[derive(Clone)]
pub struct ExpiryReclaimer {
    /// Registry to normalize.
    registry: Arc<SeatRegistry>,
    /// Time source for the background sweep.
    clock: Arc<dyn Clock>,
    /// Sink for expiry events.
    events: broadcast::Sender<DomainEvent>,
}

impl std::fmt::Debug for ExpiryReclaimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiryReclaimer")
            .field("seats", &self.registry.len())
            .finish()
    }
}

impl ExpiryReclaimer {
    /// Creates a reclaimer over `registry`.
    pub fn new(
        registry: Arc<SeatRegistry>,
        clock: Arc<dyn Clock>,
        events: broadcast::Sender<DomainEvent>,
    ) -> Self {
        Self {
            registry,
            clock,
            events,
        }
    }

    /// Reclaims `seat_id` if its lease lapsed at `now` and returns the seat
    /// as stored afterwards.
    pub fn normalize_seat(&self, seat_id: &str, now: DateTime<Utc>) -> AppResult<Seat> {
        let (seat, _) = self
            .registry
            .reclaim_one(seat_id, now, |lease| self.publish(lease, now))?;
        Ok(seat)
    }

    /// Reclaims every lease lapsed at `now` and returns a snapshot of all
    /// seats taken in the same critical section.
    pub fn normalize_all(&self, now: DateTime<Utc>) -> Vec<Seat> {
        let (seats, _) = self
            .registry
            .reclaim_and_list(now, |lease| self.publish(lease, now));
        seats
    }

    /// One active sweep. Returns the number of leases reclaimed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        self.registry
            .reclaim_expired(now, |lease| self.publish(lease, now))
            .len()
    }

    /// Sweeps every `interval` until `shutdown` flips to `true` or its
    /// sender is dropped.
    pub async fn run(&self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_ms = interval.as_millis() as u64,
            seats = self.registry.len(),
            "Expiry reclaimer started"
        );

        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Expiry reclaimer received shutdown signal");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let count = self.sweep();
                    if count > 0 {
                        debug!(reclaimed = count, "Expiry sweep completed");
                    }
                }
            }
        }

        info!("Expiry reclaimer stopped");
    }

    fn publish(&self, lease: &ReclaimedLease, now: DateTime<Utc>) {
        info!(
            seat_id = %lease.seat_id,
            holder = %lease.holder,
            lease_deadline = %lease.lease_deadline,
            "Lapsed lease reclaimed"
        );
        // No subscribers is not an error.
        let _ = self.events.send(DomainEvent::new(
            now,
            None,
            SeatEvent::Expired {
                seat_id: lease.seat_id.clone(),
                holder: lease.holder.clone(),
            },
        ));
    }
}
