use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use tripdesk_store::wire::{ObserverQuery, UnreadCountResponse};
use tripdesk_store::MessageStore;

use crate::error::ApiResult;
use crate::state::AppState;

/// Authoritative unread count for the observer, reconciled per thread
/// server-side.
pub async fn unread_count(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ObserverQuery>,
) -> ApiResult<Json<UnreadCountResponse>> {
    let unread = state.store.unread_count(&query.observer()).await?;
    Ok(Json(UnreadCountResponse { unread }))
}

/// Record that the observer has read the thread up to now. Idempotent; the
/// receipt never moves backward.
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    Query(query): Query<ObserverQuery>,
) -> ApiResult<StatusCode> {
    state.store.mark_read(&query.observer(), &thread_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
