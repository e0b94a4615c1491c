//! Shared test helpers for integration tests.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use boxoffice_api::AppState;
use boxoffice_core::config::AppConfig;
use boxoffice_lease::{LeaseManager, ManualClock, SeatRegistry};

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Lease engine behind the router, for direct assertions
    pub manager: Arc<LeaseManager>,
    /// Clock driving every lease deadline
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    /// Seats `A1`..`A3`, a 60s default TTL, and a frozen clock.
    pub fn new() -> Self {
        Self::with_seats(&["A1", "A2", "A3"])
    }

    /// A test application over the given seat ids.
    pub fn with_seats(ids: &[&str]) -> Self {
        let config = AppConfig::default();
        let clock = Arc::new(ManualClock::default());
        let registry =
            Arc::new(SeatRegistry::new(ids.iter().copied()).expect("Failed to seed registry"));
        let manager = Arc::new(LeaseManager::new(
            registry,
            clock.clone(),
            Duration::from_secs(60),
            Duration::from_secs(600),
            64,
        ));

        let state = AppState::new(Arc::new(config), Arc::clone(&manager));
        let router = boxoffice_api::build_router(state);

        Self {
            router,
            manager,
            clock,
        }
    }

    /// Make a request to the test app
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();
        self.raw_request(method, path, body_str).await
    }

    /// Make a request with a verbatim body, for malformed-input tests
    pub async fn raw_request(&self, method: &str, path: &str, body: String) -> TestResponse {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// POST /api/seats/lock
    pub async fn lock(&self, seat: &str, user: &str) -> TestResponse {
        self.request(
            "POST",
            "/api/seats/lock",
            Some(serde_json::json!({ "seatId": seat, "user": user })),
        )
        .await
    }

    /// POST /api/seats/confirm
    pub async fn confirm(&self, seat: &str, user: &str) -> TestResponse {
        self.request(
            "POST",
            "/api/seats/confirm",
            Some(serde_json::json!({ "seatId": seat, "user": user })),
        )
        .await
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `reason` field of a conflict body.
    pub fn reason(&self) -> Option<&str> {
        self.body.get("reason").and_then(Value::as_str)
    }
}
