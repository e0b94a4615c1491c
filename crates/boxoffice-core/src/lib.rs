//! # boxoffice-core
//!
//! Core crate for Box Office. Contains configuration schemas, typed
//! identifiers, the seat data model, lease events, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other Box Office crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod types;

pub use error::{AppError, ConflictReason, ErrorKind};
pub use result::AppResult;
