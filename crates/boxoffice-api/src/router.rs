//! Route definitions for the Box Office HTTP API.
//!
//! All routes are mounted under `/api`. The router receives `AppState` and
//! passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(seat_routes())
        .merge(health_routes());

    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Seat leases and pool status
fn seat_routes() -> Router<AppState> {
    Router::new()
        .route("/seats", get(handlers::seat::list_seats))
        .route("/seats/lock", post(handlers::seat::lock_seat))
        .route("/seats/confirm", post(handlers::seat::confirm_seat))
        .route("/seats/{id}", get(handlers::seat::get_seat))
        .route("/pool", get(handlers::seat::pool_status))
}

/// Health check endpoints
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
