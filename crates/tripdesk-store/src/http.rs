use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::{Client, StatusCode};

use tripdesk_types::{ChangeEvent, Observer, Reply, Thread, ThreadStatus};

use crate::client::{EventSource, MessageStore};
use crate::error::{Result, StoreError};
use crate::sse;
use crate::wire::{
    AddReplyRequest, AssignRequest, CreateThreadRequest, ObserverQuery, ThreadListResponse,
    UnreadCountResponse, UpdateStatusRequest,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// reqwest-backed [`MessageStore`] against the TripDesk API.
///
/// The push channel is consumed from the `/events` SSE endpoint; the
/// subscription reconnects forever with a fixed delay, staying quiet while
/// the backend is unreachable (the caller's fallback poll covers the gap).
pub struct HttpStore {
    client: Client,
    base_url: String,
}

impl HttpStore {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(StoreError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Client with caller-supplied settings (timeouts, proxies, TLS).
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn error_for(&self, thread_id: &str, response: reqwest::Response) -> StoreError {
        let status = response.status();
        match status {
            StatusCode::NOT_FOUND => StoreError::ThreadNotFound(thread_id.to_string()),
            StatusCode::CONFLICT => StoreError::ThreadClosed(thread_id.to_string()),
            _ => StoreError::UnexpectedStatus {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            },
        }
    }
}

#[async_trait]
impl MessageStore for HttpStore {
    async fn list_threads(&self, observer: &Observer) -> Result<Vec<Thread>> {
        let response = self
            .client
            .get(self.url("/threads"))
            .query(&ObserverQuery::from(observer))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.error_for("", response).await);
        }

        let body: ThreadListResponse = response.json().await?;
        Ok(body.threads)
    }

    async fn unread_count(&self, observer: &Observer) -> Result<u64> {
        let response = self
            .client
            .get(self.url("/threads/unread-count"))
            .query(&ObserverQuery::from(observer))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.error_for("", response).await);
        }

        let body: UnreadCountResponse = response.json().await?;
        Ok(body.unread)
    }

    async fn mark_read(&self, observer: &Observer, thread_id: &str) -> Result<()> {
        let response = self
            .client
            .patch(self.url(&format!("/threads/{}/read", thread_id)))
            .query(&ObserverQuery::from(observer))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.error_for(thread_id, response).await);
        }
        Ok(())
    }

    async fn create_thread(
        &self,
        observer: &Observer,
        subject: &str,
        body: &str,
    ) -> Result<Thread> {
        let response = self
            .client
            .post(self.url("/threads"))
            .json(&CreateThreadRequest {
                observer: observer.clone(),
                subject: subject.to_string(),
                body: body.to_string(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.error_for("", response).await);
        }
        Ok(response.json().await?)
    }

    async fn add_reply(
        &self,
        observer: &Observer,
        thread_id: &str,
        content: &str,
    ) -> Result<Reply> {
        let response = self
            .client
            .post(self.url(&format!("/threads/{}/replies", thread_id)))
            .json(&AddReplyRequest {
                observer: observer.clone(),
                content: content.to_string(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.error_for(thread_id, response).await);
        }
        Ok(response.json().await?)
    }

    async fn update_status(&self, thread_id: &str, status: ThreadStatus) -> Result<()> {
        let response = self
            .client
            .patch(self.url(&format!("/threads/{}/status", thread_id)))
            .json(&UpdateStatusRequest { status })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.error_for(thread_id, response).await);
        }
        Ok(())
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/threads/{}", thread_id)))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.error_for(thread_id, response).await);
        }
        Ok(())
    }

    async fn assign(&self, thread_id: &str, staff_id: &str) -> Result<()> {
        let response = self
            .client
            .patch(self.url(&format!("/threads/{}/assign", thread_id)))
            .json(&AssignRequest {
                staff_id: staff_id.to_string(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.error_for(thread_id, response).await);
        }
        Ok(())
    }
}

impl EventSource for HttpStore {
    fn subscribe(&self) -> BoxStream<'static, ChangeEvent> {
        // The long-lived SSE request must not inherit the per-request
        // timeout, or the stream would be cut every few seconds.
        let client = Client::builder()
            .connect_timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| self.client.clone());
        let url = self.url("/events");

        Box::pin(async_stream::stream! {
            loop {
                match client.get(&url).send().await {
                    Ok(response) if response.status().is_success() => {
                        let mut frames = std::pin::pin!(sse::change_events(response));
                        while let Some(event) = frames.next().await {
                            yield event;
                        }
                        tracing::debug!("event stream ended, reconnecting");
                    }
                    Ok(response) => {
                        tracing::debug!(status = %response.status(), "event stream rejected");
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, "event stream connect failed");
                    }
                }
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        })
    }
}
