use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Request logging middleware.
pub async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    tracing::info!(
        method = %method,
        path = %path,
        status = %response.status(),
        latency_ms = %started.elapsed().as_millis(),
        "request handled"
    );

    response
}
