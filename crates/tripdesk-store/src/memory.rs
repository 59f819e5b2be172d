use std::collections::HashMap;

use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use futures::StreamExt;
use tokio::sync::{broadcast, RwLock};
use tokio_stream::wrappers::BroadcastStream;

use async_trait::async_trait;
use tripdesk_types::{ChangeEvent, Observer, Reply, Thread, ThreadStatus};

use crate::client::{EventSource, MessageStore};
use crate::error::{Result, StoreError};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// In-memory authoritative store.
///
/// Behaves like the production backend from the client's point of view:
/// per-key serialized writes (one `RwLock` around the whole state), max-wins
/// read receipts, role-filtered thread visibility and a broadcast push
/// channel. Backs the reference API server and every test suite.
pub struct MemoryStore {
    state: RwLock<State>,
    events: broadcast::Sender<ChangeEvent>,
}

#[derive(Default)]
struct State {
    /// Creation order is preserved; thread count stays small enough that
    /// linear lookup is fine.
    threads: Vec<Thread>,
    /// `(observer id, thread id)` -> instant the observer last read up to.
    read_receipts: HashMap<(String, String), DateTime<Utc>>,
}

impl State {
    fn thread(&self, thread_id: &str) -> Result<&Thread> {
        self.threads
            .iter()
            .find(|t| t.id == thread_id)
            .ok_or_else(|| StoreError::ThreadNotFound(thread_id.to_string()))
    }

    fn thread_mut(&mut self, thread_id: &str) -> Result<&mut Thread> {
        self.threads
            .iter_mut()
            .find(|t| t.id == thread_id)
            .ok_or_else(|| StoreError::ThreadNotFound(thread_id.to_string()))
    }

    fn visible_to<'a>(&'a self, observer: &'a Observer) -> impl Iterator<Item = &'a Thread> {
        self.threads
            .iter()
            .filter(move |t| observer.role.is_staff() || t.sender.id == observer.id)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: RwLock::new(State::default()),
            events,
        }
    }

    fn emit(&self, event: ChangeEvent) {
        // No receivers is fine; nobody is connected yet.
        let _ = self.events.send(event);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn list_threads(&self, observer: &Observer) -> Result<Vec<Thread>> {
        let state = self.state.read().await;
        Ok(state.visible_to(observer).cloned().collect())
    }

    async fn unread_count(&self, observer: &Observer) -> Result<u64> {
        let state = self.state.read().await;
        let total = state
            .visible_to(observer)
            .map(|t| {
                let receipt = state
                    .read_receipts
                    .get(&(observer.id.clone(), t.id.clone()))
                    .copied();
                t.unread_for(observer.role, receipt) as u64
            })
            .sum();
        Ok(total)
    }

    async fn mark_read(&self, observer: &Observer, thread_id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state.thread(thread_id)?;

        let now = Utc::now();
        let receipt = state
            .read_receipts
            .entry((observer.id.clone(), thread_id.to_string()))
            .or_insert(now);
        // Max-wins: a receipt never moves backward.
        if now > *receipt {
            *receipt = now;
        }
        Ok(())
    }

    async fn create_thread(
        &self,
        observer: &Observer,
        subject: &str,
        body: &str,
    ) -> Result<Thread> {
        let now = Utc::now();
        let thread = Thread {
            id: uuid::Uuid::new_v4().to_string(),
            sender: observer.as_sender(),
            subject: subject.to_string(),
            body: body.to_string(),
            status: ThreadStatus::Pending,
            replies: Vec::new(),
            assigned_to: None,
            created_at: now,
            updated_at: now,
        };

        self.state.write().await.threads.push(thread.clone());

        self.emit(ChangeEvent::ThreadCreated {
            thread_id: thread.id.clone(),
        });
        self.emit(ChangeEvent::ListUpdated);
        Ok(thread)
    }

    async fn add_reply(
        &self,
        observer: &Observer,
        thread_id: &str,
        content: &str,
    ) -> Result<Reply> {
        let reply = {
            let mut state = self.state.write().await;
            let thread = state.thread_mut(thread_id)?;
            if !thread.status.accepts_replies() {
                return Err(StoreError::ThreadClosed(thread_id.to_string()));
            }

            let now = Utc::now();
            let reply = Reply {
                id: Some(uuid::Uuid::new_v4().to_string()),
                sender: observer.as_sender(),
                content: content.to_string(),
                attachments: Vec::new(),
                created_at: now,
                edited_at: None,
            };
            thread.replies.push(reply.clone());
            thread.updated_at = now;
            reply
        };

        self.emit(ChangeEvent::ReplyAdded {
            thread_id: thread_id.to_string(),
            reply_id: reply.id.clone(),
        });
        self.emit(ChangeEvent::RefreshUnread);
        Ok(reply)
    }

    async fn update_status(&self, thread_id: &str, status: ThreadStatus) -> Result<()> {
        {
            let mut state = self.state.write().await;
            let thread = state.thread_mut(thread_id)?;
            thread.status = status;
            thread.updated_at = Utc::now();
        }

        self.emit(ChangeEvent::StatusChanged {
            thread_id: thread_id.to_string(),
            status,
        });
        Ok(())
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<()> {
        {
            let mut state = self.state.write().await;
            state.thread(thread_id)?;
            state.threads.retain(|t| t.id != thread_id);
        }

        self.emit(ChangeEvent::ThreadDeleted {
            thread_id: thread_id.to_string(),
        });
        self.emit(ChangeEvent::ListUpdated);
        Ok(())
    }

    async fn assign(&self, thread_id: &str, staff_id: &str) -> Result<()> {
        {
            let mut state = self.state.write().await;
            let thread = state.thread_mut(thread_id)?;
            thread.assigned_to = Some(staff_id.to_string());
            thread.updated_at = Utc::now();
        }

        self.emit(ChangeEvent::ThreadEdited {
            thread_id: thread_id.to_string(),
        });
        Ok(())
    }
}

impl EventSource for MemoryStore {
    fn subscribe(&self) -> BoxStream<'static, ChangeEvent> {
        // Lagged receivers skip what they missed; the fallback poll covers it.
        BroadcastStream::new(self.events.subscribe())
            .filter_map(|item| async move { item.ok() })
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn traveler() -> Observer {
        Observer::new("u-1", "Ana", tripdesk_types::SenderRole::Traveler)
    }

    fn agent() -> Observer {
        Observer::new("a-1", "Sam", tripdesk_types::SenderRole::Agent)
    }

    #[tokio::test]
    async fn observer_with_no_threads_has_zero_unread() {
        let store = MemoryStore::new();
        assert_eq!(store.unread_count(&traveler()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unread_counts_only_the_other_side() {
        let store = MemoryStore::new();
        let ana = traveler();
        let sam = agent();

        let thread = store.create_thread(&ana, "Hotel", "Wrong room type").await.unwrap();
        store.add_reply(&sam, &thread.id, "Looking into it").await.unwrap();
        store.add_reply(&sam, &thread.id, "Fixed").await.unwrap();

        // Ana never opened the thread: both agent replies are unread, her
        // own opening message is not.
        assert_eq!(store.unread_count(&ana).await.unwrap(), 2);

        // Sam sees the traveler's opening message as unread.
        assert_eq!(store.unread_count(&sam).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn mark_read_clears_and_is_idempotent() {
        let store = MemoryStore::new();
        let ana = traveler();
        let sam = agent();

        let thread = store.create_thread(&ana, "Car", "Pickup moved").await.unwrap();
        store.add_reply(&sam, &thread.id, "Confirmed").await.unwrap();
        assert_eq!(store.unread_count(&ana).await.unwrap(), 1);

        store.mark_read(&ana, &thread.id).await.unwrap();
        assert_eq!(store.unread_count(&ana).await.unwrap(), 0);

        // Second call: same observable state, no error.
        store.mark_read(&ana, &thread.id).await.unwrap();
        assert_eq!(store.unread_count(&ana).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn read_receipts_never_move_backward() {
        let store = MemoryStore::new();
        let ana = traveler();
        let sam = agent();

        let thread = store.create_thread(&ana, "Flight", "Seat change").await.unwrap();
        store.add_reply(&sam, &thread.id, "Done").await.unwrap();
        store.mark_read(&ana, &thread.id).await.unwrap();

        // Simulate a stale client re-sending an old receipt by rewinding the
        // stored instant and marking again: the max-wins rule advances it.
        let key = ("u-1".to_string(), thread.id.clone());
        let fresh = {
            let state = store.state.read().await;
            state.read_receipts[&key]
        };
        {
            let mut state = store.state.write().await;
            state
                .read_receipts
                .insert(key.clone(), fresh - Duration::minutes(10));
        }
        store.mark_read(&ana, &thread.id).await.unwrap();

        let advanced = {
            let state = store.state.read().await;
            state.read_receipts[&key]
        };
        assert!(advanced >= fresh);
    }

    #[tokio::test]
    async fn closed_threads_reject_replies() {
        let store = MemoryStore::new();
        let ana = traveler();

        let thread = store.create_thread(&ana, "Visa", "Docs needed").await.unwrap();
        store.update_status(&thread.id, ThreadStatus::Closed).await.unwrap();

        let err = store.add_reply(&ana, &thread.id, "One more thing").await.unwrap_err();
        assert!(matches!(err, StoreError::ThreadClosed(_)));
    }

    #[tokio::test]
    async fn travelers_see_only_their_own_threads() {
        let store = MemoryStore::new();
        let ana = traveler();
        let other = Observer::new("u-2", "Bo", tripdesk_types::SenderRole::Traveler);
        let sam = agent();

        store.create_thread(&ana, "A", "a").await.unwrap();
        store.create_thread(&other, "B", "b").await.unwrap();

        assert_eq!(store.list_threads(&ana).await.unwrap().len(), 1);
        assert_eq!(store.list_threads(&other).await.unwrap().len(), 1);
        assert_eq!(store.list_threads(&sam).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn mutations_emit_typed_events() {
        use futures::StreamExt;

        let store = MemoryStore::new();
        let mut events = store.subscribe();
        let ana = traveler();

        let thread = store.create_thread(&ana, "Hotel", "hi").await.unwrap();

        let first = events.next().await.unwrap();
        assert_eq!(
            first,
            ChangeEvent::ThreadCreated {
                thread_id: thread.id.clone()
            }
        );
        let second = events.next().await.unwrap();
        assert_eq!(second, ChangeEvent::ListUpdated);
    }

    #[tokio::test]
    async fn deleting_a_thread_drops_its_unread_contribution() {
        use futures::StreamExt;

        let store = MemoryStore::new();
        let ana = traveler();
        let sam = agent();

        let thread = store.create_thread(&ana, "Insurance", "Quote?").await.unwrap();
        store.add_reply(&sam, &thread.id, "Attached").await.unwrap();
        assert_eq!(store.unread_count(&ana).await.unwrap(), 1);

        let mut events = store.subscribe();
        store.delete_thread(&thread.id).await.unwrap();

        assert_eq!(store.unread_count(&ana).await.unwrap(), 0);
        assert!(store.list_threads(&ana).await.unwrap().is_empty());
        assert_eq!(
            events.next().await.unwrap(),
            ChangeEvent::ThreadDeleted {
                thread_id: thread.id.clone()
            }
        );
    }

    #[tokio::test]
    async fn mark_read_on_missing_thread_errors() {
        let store = MemoryStore::new();
        let err = store.mark_read(&traveler(), "nope").await.unwrap_err();
        assert!(matches!(err, StoreError::ThreadNotFound(_)));
    }
}
