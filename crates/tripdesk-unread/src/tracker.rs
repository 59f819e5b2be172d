use std::sync::Arc;

use tripdesk_store::MessageStore;
use tripdesk_types::Observer;

use crate::cache::ReadPositionCache;

/// Advances the observer's read position for a thread.
///
/// Ordering contract: the authoritative store is written first, the local
/// cache only after that write succeeds. A failed remote write leaves the
/// cache untouched and is silent from the surface's point of view; the next
/// view event retries naturally. The client never compares message ids —
/// ids are opaque and unordered, monotonicity is the store's job.
pub struct ReadPositionTracker {
    observer: Observer,
    store: Arc<dyn MessageStore>,
    cache: Arc<ReadPositionCache>,
}

impl ReadPositionTracker {
    pub fn new(
        observer: Observer,
        store: Arc<dyn MessageStore>,
        cache: Arc<ReadPositionCache>,
    ) -> Self {
        Self {
            observer,
            store,
            cache,
        }
    }

    /// Credit the observer with having seen `last_message_id` in
    /// `thread_id`. Returns whether the authoritative write went through.
    pub async fn mark_as_read(&self, thread_id: &str, last_message_id: &str) -> bool {
        match self.store.mark_read(&self.observer, thread_id).await {
            Ok(()) => {
                self.cache
                    .record(&self.observer.id, thread_id, last_message_id);
                true
            }
            Err(e) => {
                tracing::debug!(
                    error = %e,
                    thread_id,
                    "mark-as-read failed; position will retry on next view"
                );
                false
            }
        }
    }

    /// Cached last-seen message for optimistic rendering on mount.
    pub fn last_seen(&self, thread_id: &str) -> Option<String> {
        self.cache.last_seen(&self.observer.id, thread_id)
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tripdesk_store::{Result, StoreError};
    use tripdesk_types::{Reply, SenderRole, Thread, ThreadStatus};

    /// Store stub whose mark_read can be made to fail.
    #[derive(Default)]
    struct FlakyStore {
        fail: AtomicBool,
        marks: AtomicUsize,
    }

    #[async_trait]
    impl MessageStore for FlakyStore {
        async fn list_threads(&self, _observer: &Observer) -> Result<Vec<Thread>> {
            Ok(Vec::new())
        }

        async fn unread_count(&self, _observer: &Observer) -> Result<u64> {
            Ok(0)
        }

        async fn mark_read(&self, _observer: &Observer, thread_id: &str) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(StoreError::Internal(format!("unreachable: {}", thread_id)));
            }
            self.marks.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn create_thread(
            &self,
            _observer: &Observer,
            _subject: &str,
            _body: &str,
        ) -> Result<Thread> {
            Err(StoreError::Internal("not used".into()))
        }

        async fn add_reply(
            &self,
            _observer: &Observer,
            _thread_id: &str,
            _content: &str,
        ) -> Result<Reply> {
            Err(StoreError::Internal("not used".into()))
        }

        async fn update_status(&self, _thread_id: &str, _status: ThreadStatus) -> Result<()> {
            Ok(())
        }

        async fn delete_thread(&self, _thread_id: &str) -> Result<()> {
            Ok(())
        }

        async fn assign(&self, _thread_id: &str, _staff_id: &str) -> Result<()> {
            Ok(())
        }
    }

    fn tracker_with(store: Arc<FlakyStore>) -> (ReadPositionTracker, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(ReadPositionCache::open(dir.path()).unwrap());
        let observer = Observer::new("u-1", "Ana", SenderRole::Traveler);
        (ReadPositionTracker::new(observer, store, cache), dir)
    }

    #[tokio::test]
    async fn remote_success_updates_cache() {
        let store = Arc::new(FlakyStore::default());
        let (tracker, _dir) = tracker_with(store.clone());

        assert!(tracker.mark_as_read("t-1", "m-7").await);
        assert_eq!(tracker.last_seen("t-1"), Some("m-7".to_string()));
        assert_eq!(store.marks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn remote_failure_leaves_cache_untouched() {
        let store = Arc::new(FlakyStore::default());
        let (tracker, _dir) = tracker_with(store.clone());

        store.fail.store(true, Ordering::SeqCst);
        assert!(!tracker.mark_as_read("t-1", "m-7").await);
        assert_eq!(tracker.last_seen("t-1"), None);

        // Retry on the next view event succeeds and lands the position.
        store.fail.store(false, Ordering::SeqCst);
        assert!(tracker.mark_as_read("t-1", "m-7").await);
        assert_eq!(tracker.last_seen("t-1"), Some("m-7".to_string()));
    }

    #[tokio::test]
    async fn marking_twice_is_idempotent() {
        let store = Arc::new(FlakyStore::default());
        let (tracker, _dir) = tracker_with(store.clone());

        assert!(tracker.mark_as_read("t-1", "m-7").await);
        assert!(tracker.mark_as_read("t-1", "m-7").await);
        assert_eq!(tracker.last_seen("t-1"), Some("m-7".to_string()));
    }
}
