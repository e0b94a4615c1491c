//! # boxoffice-lease
//!
//! The seat lease engine: a fixed pool of seats that can be acquired
//! under a time-bounded lease, confirmed by the lease holder, or
//! reclaimed once the lease lapses.
//!
//! ## Modules
//!
//! - `clock` — Injectable time source
//! - `registry` — Authoritative seat state with atomic transitions
//! - `policy` — Pure effective-state and legality decisions
//! - `manager` — `acquire` / `confirm` / `list` orchestration
//! - `reclaimer` — Lazy and background reclamation of lapsed leases

pub mod clock;
pub mod manager;
pub mod policy;
pub mod reclaimer;
pub mod registry;

pub use clock::{Clock, ManualClock, SystemClock};
pub use manager::LeaseManager;
pub use reclaimer::ExpiryReclaimer;
pub use registry::{SeatRegistry, TransitionError};
