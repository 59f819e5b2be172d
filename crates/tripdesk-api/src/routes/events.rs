use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use futures::StreamExt;

use tripdesk_store::EventSource;

use crate::state::AppState;

/// Push channel: every store mutation is delivered to connected sessions as
/// a `data:` frame holding one serialized change event.
pub async fn subscribe(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = state.store.subscribe().filter_map(|event| async move {
        match serde_json::to_string(&event) {
            Ok(json) => Some(Ok(Event::default().data(json))),
            Err(e) => {
                tracing::debug!(error = %e, "failed to serialize change event");
                None
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
