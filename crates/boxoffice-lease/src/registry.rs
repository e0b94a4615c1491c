//! Seat registry: the authoritative in-memory state of every seat.
//!
//! The identifier set is fixed at construction. Seat state is only changed
//! through [`SeatRegistry::transition`] (compare-and-set) and the reclaim
//! primitives, each of which runs inside one critical section.
//!
//! The mutating primitives take a callback that runs before the lock is
//! released. Events published from it are therefore ordered per seat the
//! same way the state changes are.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use boxoffice_core::error::AppError;
use boxoffice_core::result::AppResult;
use boxoffice_core::types::{HolderId, Seat, SeatId, SeatState};

use crate::policy;

/// A lapsed lease that was rewritten back to `Available`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReclaimedLease {
    /// The seat that became available.
    pub seat_id: SeatId,
    /// Holder of the lapsed lease.
    pub holder: HolderId,
    /// Deadline the lease ran past.
    pub lease_deadline: DateTime<Utc>,
}

/// Failure of a compare-and-set transition.
#[derive(Debug, Clone, Error)]
pub enum TransitionError {
    /// No seat with this id exists.
    #[error("Seat {0} not found")]
    NotFound(SeatId),
    /// The stored state no longer matched the expected state.
    #[error("Seat {} changed state concurrently (now {})", .current.id, .current.state.status())]
    Stale {
        /// The seat as it is now.
        current: Seat,
    },
}

/// A stale transition only has a meaningful conflict reason relative to
/// the operation that attempted it, so callers decide that themselves.
/// Reaching this conversion with `Stale` is an internal error.
impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        match &err {
            TransitionError::NotFound(_) => AppError::not_found(err.to_string()),
            TransitionError::Stale { .. } => AppError::internal(err.to_string()),
        }
    }
}

/// Fixed pool of seats guarded by a single mutex.
///
/// Critical sections are O(1) for single-seat operations and O(n) for
/// enumeration, so one lock keeps `list` a point-in-time view without
/// measurable contention on small pools.
#[derive(Debug)]
pub struct SeatRegistry {
    /// Seat id to position in `seats`. Immutable after construction.
    index: HashMap<SeatId, usize>,
    /// Seats in seeding order.
    seats: Mutex<Vec<Seat>>,
}

impl SeatRegistry {
    /// Creates a registry with every seat `Available`, in the given order.
    ///
    /// Fails on an empty set, an empty id, or a duplicate id.
    pub fn new<I, S>(ids: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<SeatId>,
    {
        let mut index = HashMap::new();
        let mut seats = Vec::new();

        for id in ids {
            let id: SeatId = id.into();
            if id.as_str().trim().is_empty() {
                return Err(AppError::configuration("Seat id must not be empty"));
            }
            if index.insert(id.clone(), seats.len()).is_some() {
                return Err(AppError::configuration(format!("Duplicate seat id '{id}'")));
            }
            seats.push(Seat::available(id));
        }

        if seats.is_empty() {
            return Err(AppError::configuration(
                "Seat registry needs at least one seat",
            ));
        }

        Ok(Self {
            index,
            seats: Mutex::new(seats),
        })
    }

    /// Number of seats.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Always false; a registry holds at least one seat.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Snapshot of all seats in seeding order, as stored.
    pub fn list(&self) -> Vec<Seat> {
        self.lock().clone()
    }

    /// Snapshot of one seat, as stored.
    pub fn get(&self, id: &str) -> AppResult<Seat> {
        let pos = self.position(id)?;
        Ok(self.lock()[pos].clone())
    }

    /// Atomically replaces the state of `id` with `next` if it still equals
    /// `expected`.
    ///
    /// This is the only way a lease is granted or confirmed: of several
    /// callers racing from the same observed state, exactly one wins.
    pub fn transition(
        &self,
        id: &str,
        expected: &SeatState,
        next: SeatState,
    ) -> Result<Seat, TransitionError> {
        self.transition_then(id, expected, next, |_| {})
    }

    /// [`transition`](Self::transition), calling `on_applied` with the new
    /// seat before the lock is released.
    pub fn transition_then<F>(
        &self,
        id: &str,
        expected: &SeatState,
        next: SeatState,
        on_applied: F,
    ) -> Result<Seat, TransitionError>
    where
        F: FnOnce(&Seat),
    {
        let pos = self
            .index
            .get(id)
            .copied()
            .ok_or_else(|| TransitionError::NotFound(SeatId::from(id)))?;

        let mut seats = self.lock();
        let seat = &mut seats[pos];

        if seat.state != *expected {
            debug!(
                seat_id = %seat.id,
                expected = %expected.status(),
                actual = %seat.state.status(),
                "Stale seat transition rejected"
            );
            return Err(TransitionError::Stale {
                current: seat.clone(),
            });
        }

        seat.state = next;
        on_applied(seat);
        Ok(seat.clone())
    }

    /// Rewrites `id` to `Available` if its lease has lapsed at `now`, then
    /// returns the seat as stored afterwards.
    pub fn reclaim_one<F>(
        &self,
        id: &str,
        now: DateTime<Utc>,
        mut on_reclaim: F,
    ) -> AppResult<(Seat, Option<ReclaimedLease>)>
    where
        F: FnMut(&ReclaimedLease),
    {
        let pos = self.position(id)?;
        let mut seats = self.lock();
        let seat = &mut seats[pos];
        let reclaimed = Self::reclaim_in_place(seat, now, &mut on_reclaim);
        Ok((seat.clone(), reclaimed))
    }

    /// Rewrites every lapsed lease to `Available`.
    pub fn reclaim_expired<F>(&self, now: DateTime<Utc>, mut on_reclaim: F) -> Vec<ReclaimedLease>
    where
        F: FnMut(&ReclaimedLease),
    {
        let mut seats = self.lock();
        seats
            .iter_mut()
            .filter_map(|seat| Self::reclaim_in_place(seat, now, &mut on_reclaim))
            .collect()
    }

    /// Reclaims every lapsed lease and snapshots all seats in the same
    /// critical section, so the snapshot never contains a lapsed lease.
    pub fn reclaim_and_list<F>(
        &self,
        now: DateTime<Utc>,
        mut on_reclaim: F,
    ) -> (Vec<Seat>, Vec<ReclaimedLease>)
    where
        F: FnMut(&ReclaimedLease),
    {
        let mut seats = self.lock();
        let reclaimed = seats
            .iter_mut()
            .filter_map(|seat| Self::reclaim_in_place(seat, now, &mut on_reclaim))
            .collect();
        (seats.clone(), reclaimed)
    }

    fn reclaim_in_place<F>(
        seat: &mut Seat,
        now: DateTime<Utc>,
        on_reclaim: &mut F,
    ) -> Option<ReclaimedLease>
    where
        F: FnMut(&ReclaimedLease),
    {
        if !policy::is_lapsed(&seat.state, now) {
            return None;
        }
        match std::mem::replace(&mut seat.state, SeatState::Available) {
            SeatState::Held {
                holder,
                lease_deadline,
            } => {
                let lease = ReclaimedLease {
                    seat_id: seat.id.clone(),
                    holder,
                    lease_deadline,
                };
                on_reclaim(&lease);
                Some(lease)
            }
            other => {
                seat.state = other;
                None
            }
        }
    }

    fn position(&self, id: &str) -> AppResult<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| AppError::not_found(format!("Seat {id} not found")))
    }

    /// Every write under this lock is a single assignment, so a poisoned
    /// lock still guards a consistent vector.
    fn lock(&self) -> MutexGuard<'_, Vec<Seat>> {
        self.seats.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
