//! Request logging middleware.
//!
//! Health probes are logged at debug so that polling does not drown out
//! seat traffic. Server errors are logged at warn; refused seat operations
//! (4xx) are ordinary outcomes and stay at info.

use std::time::Instant;

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use tracing::Level;

/// Logs method, path, status, and latency of every request.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let latency_ms = start.elapsed().as_millis() as u64;

    macro_rules! log_at {
        ($level:expr) => {
            tracing::event!(
                $level,
                method = %method,
                path = %path,
                status = status.as_u16(),
                latency_ms,
                "HTTP request"
            )
        };
    }

    let level = level_for(&path, status);
    if level == Level::WARN {
        log_at!(Level::WARN);
    } else if level == Level::DEBUG {
        log_at!(Level::DEBUG);
    } else {
        log_at!(Level::INFO);
    }

    response
}

/// Log level for a finished request.
fn level_for(path: &str, status: StatusCode) -> Level {
    if status.is_server_error() {
        Level::WARN
    } else if path.ends_with("/health") {
        Level::DEBUG
    } else {
        Level::INFO
    }
}
