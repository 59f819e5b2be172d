use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use tripdesk_store::wire::{
    AddReplyRequest, AssignRequest, CreateThreadRequest, ObserverQuery, ThreadListResponse,
    UpdateStatusRequest,
};
use tripdesk_store::MessageStore;
use tripdesk_types::{Reply, Thread};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// List all threads visible to the observer, replies included.
pub async fn list_threads(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ObserverQuery>,
) -> ApiResult<Json<ThreadListResponse>> {
    let threads = state.store.list_threads(&query.observer()).await?;
    Ok(Json(ThreadListResponse { threads }))
}

/// Open a new support thread.
pub async fn create_thread(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateThreadRequest>,
) -> ApiResult<(StatusCode, Json<Thread>)> {
    if req.subject.trim().is_empty() {
        return Err(ApiError::BadRequest("subject must not be empty".to_string()));
    }

    let thread = state
        .store
        .create_thread(&req.observer, &req.subject, &req.body)
        .await?;
    Ok((StatusCode::CREATED, Json(thread)))
}

/// Append a reply; 409 when the thread is closed.
pub async fn add_reply(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    Json(req): Json<AddReplyRequest>,
) -> ApiResult<(StatusCode, Json<Reply>)> {
    if req.content.trim().is_empty() {
        return Err(ApiError::BadRequest("content must not be empty".to_string()));
    }

    let reply = state
        .store
        .add_reply(&req.observer, &thread_id, &req.content)
        .await?;
    Ok((StatusCode::CREATED, Json(reply)))
}

/// Move a thread to a new lifecycle status.
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<StatusCode> {
    state.store.update_status(&thread_id, req.status).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Remove a thread.
pub async fn delete_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.store.delete_thread(&thread_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Hand a thread to a staff identity.
pub async fn assign(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    Json(req): Json<AssignRequest>,
) -> ApiResult<StatusCode> {
    state.store.assign(&thread_id, &req.staff_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
