//! Lease manager: `acquire`, `confirm`, and `list` over the seat registry.
//!
//! Every operation first normalizes stale state through the
//! [`ExpiryReclaimer`], decides legality with the [`policy`] functions, and
//! applies the change with a single compare-and-set on the registry. No
//! operation waits on anything but the registry's short critical section.
//!
//! Events are sent from inside that critical section, so subscribers see
//! the events of one seat in the order its state changed.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::broadcast;
use tracing::{debug, info};

use boxoffice_core::config::LeaseConfig;
use boxoffice_core::error::{AppError, ConflictReason};
use boxoffice_core::events::{DomainEvent, SeatEvent};
use boxoffice_core::result::AppResult;
use boxoffice_core::types::{HolderId, PoolStatus, Seat, SeatState};

use crate::clock::Clock;
use crate::policy;
use crate::reclaimer::ExpiryReclaimer;
use crate::registry::{SeatRegistry, TransitionError};

/// Orchestrates seat leases.
#[derive(Clone)]
pub struct LeaseManager {
    /// Authoritative seat state.
    registry: Arc<SeatRegistry>,
    /// Lazy reclamation on every access.
    reclaimer: ExpiryReclaimer,
    /// Time source for deadlines.
    clock: Arc<dyn Clock>,
    /// TTL applied when the caller supplies none.
    default_ttl: Duration,
    /// Upper bound on caller-supplied TTLs.
    max_ttl: Duration,
    /// Lease event publisher.
    events: broadcast::Sender<DomainEvent>,
}

impl std::fmt::Debug for LeaseManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeaseManager")
            .field("seats", &self.registry.len())
            .field("default_ttl", &self.default_ttl)
            .field("max_ttl", &self.max_ttl)
            .finish()
    }
}

impl LeaseManager {
    /// Seeds a registry from `config` and builds a manager over it.
    pub fn from_config(config: &LeaseConfig, clock: Arc<dyn Clock>) -> AppResult<Self> {
        let registry = Arc::new(SeatRegistry::new(config.seat_ids())?);
        info!(
            seats = registry.len(),
            default_ttl_seconds = config.default_ttl_seconds,
            "Seat registry seeded"
        );
        Ok(Self::new(
            registry,
            clock,
            config.default_ttl(),
            config.max_ttl(),
            config.event_buffer,
        ))
    }

    /// Creates a manager over an existing registry.
    ///
    /// # Panics
    ///
    /// Panics if `event_buffer` is zero.
    pub fn new(
        registry: Arc<SeatRegistry>,
        clock: Arc<dyn Clock>,
        default_ttl: Duration,
        max_ttl: Duration,
        event_buffer: usize,
    ) -> Self {
        let (events, _) = broadcast::channel(event_buffer);
        let reclaimer = ExpiryReclaimer::new(
            Arc::clone(&registry),
            Arc::clone(&clock),
            events.clone(),
        );
        Self {
            registry,
            reclaimer,
            clock,
            default_ttl,
            max_ttl: max_ttl.max(default_ttl),
            events,
        }
    }

    /// The reclaimer sharing this manager's registry, for the background
    /// sweep.
    pub fn reclaimer(&self) -> ExpiryReclaimer {
        self.reclaimer.clone()
    }

    /// Subscribes to lease events.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.events.subscribe()
    }

    /// All seats in seeding order, with lapsed leases reclaimed.
    pub fn list(&self) -> Vec<Seat> {
        self.reclaimer.normalize_all(self.clock.now())
    }

    /// One seat, with a lapsed lease reclaimed.
    pub fn get(&self, seat_id: &str) -> AppResult<Seat> {
        self.reclaimer.normalize_seat(seat_id, self.clock.now())
    }

    /// Seat counts by effective state.
    pub fn pool_status(&self) -> PoolStatus {
        PoolStatus::tally(&self.list())
    }

    /// Grants `holder` a lease on `seat_id` for `ttl` (or the default TTL).
    ///
    /// Fails with `NotFound`, `Conflict(AlreadyCommitted)`, or
    /// `Conflict(AlreadyHeld)`; a caller that loses a race for the same
    /// seat gets `Conflict(AlreadyHeld)`.
    pub fn acquire(
        &self,
        seat_id: &str,
        holder: &HolderId,
        ttl: Option<Duration>,
    ) -> AppResult<Seat> {
        let ttl = self.resolve_ttl(ttl)?;
        let now = self.clock.now();
        let current = self.reclaimer.normalize_seat(seat_id, now)?;

        if let Err(reason) = policy::check_acquire(&current.state, now) {
            debug!(seat_id = %seat_id, holder = %holder, reason = %reason, "Acquire refused");
            return Err(conflict(seat_id, reason));
        }

        let lease_deadline = now.checked_add_signed(ttl).ok_or_else(|| {
            AppError::validation(format!(
                "Lease TTL of {}s puts the deadline out of range",
                ttl.num_seconds()
            ))
        })?;
        let next = SeatState::Held {
            holder: holder.clone(),
            lease_deadline,
        };

        let seat = self
            .registry
            .transition_then(seat_id, &current.state, next, |seat| {
                self.publish(
                    now,
                    Some(holder.clone()),
                    SeatEvent::Held {
                        seat_id: seat.id.clone(),
                        holder: holder.clone(),
                        lease_deadline,
                    },
                )
            })
            .map_err(|err| match err {
                TransitionError::Stale { current } => {
                    let reason = acquire_race_reason(&current.state, now);
                    debug!(seat_id = %seat_id, holder = %holder, reason = %reason, "Acquire lost race");
                    conflict(seat_id, reason)
                }
                other => AppError::from(other),
            })?;

        info!(
            seat_id = %seat_id,
            holder = %holder,
            lease_deadline = %lease_deadline,
            "Seat held"
        );

        Ok(seat)
    }

    /// Commits `seat_id` for `holder`, who must own its live lease.
    ///
    /// Fails with `NotFound`, `Conflict(Expired)`, `Conflict(NotHolder)`, or
    /// `Conflict(AlreadyCommitted)`. A refused confirm never changes the
    /// seat.
    pub fn confirm(&self, seat_id: &str, holder: &HolderId) -> AppResult<Seat> {
        let now = self.clock.now();
        let current = self.reclaimer.normalize_seat(seat_id, now)?;

        if let Err(reason) = policy::check_confirm(&current.state, holder, now) {
            debug!(seat_id = %seat_id, holder = %holder, reason = %reason, "Confirm refused");
            return Err(conflict(seat_id, reason));
        }

        let next = SeatState::Committed {
            committed_by: holder.clone(),
            committed_at: now,
        };

        let seat = self
            .registry
            .transition_then(seat_id, &current.state, next, |seat| {
                self.publish(
                    now,
                    Some(holder.clone()),
                    SeatEvent::Committed {
                        seat_id: seat.id.clone(),
                        holder: holder.clone(),
                    },
                )
            })
            .map_err(|err| match err {
                TransitionError::Stale { current } => {
                    let reason = confirm_race_reason(&current.state, holder, now);
                    debug!(seat_id = %seat_id, holder = %holder, reason = %reason, "Confirm lost race");
                    conflict(seat_id, reason)
                }
                other => AppError::from(other),
            })?;

        info!(seat_id = %seat_id, holder = %holder, "Seat committed");

        Ok(seat)
    }

    fn resolve_ttl(&self, ttl: Option<Duration>) -> AppResult<TimeDelta> {
        let ttl = ttl.unwrap_or(self.default_ttl);
        if ttl.is_zero() {
            return Err(AppError::validation("Lease TTL must be greater than zero"));
        }
        if ttl > self.max_ttl {
            return Err(AppError::validation(format!(
                "Lease TTL of {}s exceeds the maximum of {}s",
                ttl.as_secs(),
                self.max_ttl.as_secs()
            )));
        }
        TimeDelta::from_std(ttl)
            .map_err(|e| AppError::validation(format!("Lease TTL out of range: {e}")))
    }

    fn publish(&self, at: DateTime<Utc>, actor: Option<HolderId>, payload: SeatEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(DomainEvent::new(at, actor, payload));
    }
}

/// Reason reported to an `acquire` whose compare-and-set found the seat
/// already moved on. The seat was effectively available when observed, so
/// whatever replaced that state is another caller's live lease.
fn acquire_race_reason(current: &SeatState, now: DateTime<Utc>) -> ConflictReason {
    policy::check_acquire(current, now)
        .err()
        .unwrap_or(ConflictReason::AlreadyHeld)
}

/// Reason reported to a `confirm` whose compare-and-set found the seat
/// already moved on. If the seat now carries a different live lease of the
/// same holder, the lease being confirmed is gone.
fn confirm_race_reason(current: &SeatState, holder: &HolderId, now: DateTime<Utc>) -> ConflictReason {
    policy::check_confirm(current, holder, now)
        .err()
        .unwrap_or(ConflictReason::Expired)
}

fn conflict(seat_id: &str, reason: ConflictReason) -> AppError {
    let message = match reason {
        ConflictReason::AlreadyHeld => format!("Seat {seat_id} already locked"),
        ConflictReason::AlreadyCommitted => format!("Seat {seat_id} already booked"),
        ConflictReason::NotHolder => format!("Seat {seat_id} is locked by another user"),
        ConflictReason::Expired => format!("Seat {seat_id} has no active lock to confirm"),
    };
    AppError::conflict(reason, message)
}
