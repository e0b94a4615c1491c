//! # boxoffice-api
//!
//! HTTP API layer for Box Office built on Axum.
//!
//! Maps the lease operations onto REST endpoints, validates request
//! bodies, and translates [`boxoffice_core::AppError`] into status codes.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
