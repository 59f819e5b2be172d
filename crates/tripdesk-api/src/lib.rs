//! Reference authoritative backend for the TripDesk support chat.
//!
//! Serves the store boundary over HTTP: thread CRUD, the server-side unread
//! reconciliation, monotonic read receipts and the push channel as an SSE
//! stream. State lives in a [`tripdesk_store::MemoryStore`]; the production
//! deployment swaps a database-backed implementation in behind the same
//! trait.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{delete, get, patch, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;

use crate::state::AppState;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the full application router.
pub fn app(state: Arc<AppState>) -> Router {
    // The events route must stay outside the timeout layer; SSE connections
    // are long-lived by design.
    let api = Router::new()
        .route("/health", get(routes::health::health_check))
        .route(
            "/threads",
            get(routes::threads::list_threads).post(routes::threads::create_thread),
        )
        .route("/threads/unread-count", get(routes::unread::unread_count))
        .route("/threads/:thread_id", delete(routes::threads::delete_thread))
        .route("/threads/:thread_id/replies", post(routes::threads::add_reply))
        .route("/threads/:thread_id/read", patch(routes::unread::mark_read))
        .route("/threads/:thread_id/status", patch(routes::threads::update_status))
        .route("/threads/:thread_id/assign", patch(routes::threads::assign))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT));

    let events = Router::new().route("/events", get(routes::events::subscribe));

    let mut router = api
        .merge(events)
        .layer(axum::middleware::from_fn(middleware::log_request));

    if state.config.cors.enabled {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router.with_state(state)
}
