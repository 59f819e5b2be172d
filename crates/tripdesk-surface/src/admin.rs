use std::sync::{Arc, Mutex};

use tokio::time::Instant;

use tripdesk_store::MessageStore;
use tripdesk_types::{Observer, Thread};
use tripdesk_unread::{SyncConfig, TaskGuard, UnreadAggregator};

/// Staff inbox with adaptive polling.
///
/// Polls the thread list and the unread count every 30 s while the operator
/// is active, relaxing to 60 s once no activity has been recorded for five
/// minutes. The host reports interaction through
/// [`record_activity`](AdminInbox::record_activity); the next poll picks the
/// cadence up again.
pub struct AdminInbox {
    shared: Arc<AdminShared>,
    _poll: TaskGuard,
}

struct AdminShared {
    threads: Mutex<Vec<Thread>>,
    last_activity: Mutex<Instant>,
    idle_after: std::time::Duration,
}

impl AdminInbox {
    pub fn spawn(
        observer: Observer,
        store: Arc<dyn MessageStore>,
        aggregator: Arc<UnreadAggregator>,
        config: &SyncConfig,
    ) -> Self {
        let shared = Arc::new(AdminShared {
            threads: Mutex::new(Vec::new()),
            last_activity: Mutex::new(Instant::now()),
            idle_after: config.admin_idle_after,
        });

        let poll = {
            let shared = shared.clone();
            let active_period = config.admin_active_poll;
            let idle_period = config.admin_idle_poll;
            TaskGuard::spawn(async move {
                loop {
                    let period = if shared.is_idle() {
                        idle_period
                    } else {
                        active_period
                    };
                    tokio::time::sleep(period).await;

                    match store.list_threads(&observer).await {
                        Ok(threads) => *shared.threads.lock().unwrap() = threads,
                        Err(e) => {
                            tracing::debug!(error = %e, "admin inbox list refresh failed")
                        }
                    }
                    aggregator.refresh().await;
                }
            })
        };

        Self {
            shared,
            _poll: poll,
        }
    }

    /// The operator interacted with the page; restore the active cadence.
    pub fn record_activity(&self) {
        *self.shared.last_activity.lock().unwrap() = Instant::now();
    }

    pub fn is_idle(&self) -> bool {
        self.shared.is_idle()
    }

    /// Latest polled snapshot of all threads.
    pub fn threads(&self) -> Vec<Thread> {
        self.shared.threads.lock().unwrap().clone()
    }
}

impl AdminShared {
    fn is_idle(&self) -> bool {
        self.last_activity.lock().unwrap().elapsed() >= self.idle_after
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tripdesk_store::{Result, StoreError};
    use tripdesk_types::{Reply, SenderRole, ThreadStatus};

    #[derive(Default)]
    struct CountingStore {
        lists: AtomicUsize,
    }

    #[async_trait]
    impl MessageStore for CountingStore {
        async fn list_threads(&self, _observer: &Observer) -> Result<Vec<Thread>> {
            self.lists.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }

        async fn unread_count(&self, _observer: &Observer) -> Result<u64> {
            Ok(0)
        }

        async fn mark_read(&self, _observer: &Observer, _thread_id: &str) -> Result<()> {
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

    fn admin() -> Observer {
        Observer::new("adm-1", "Root", SenderRole::Admin)
    }

    fn config() -> SyncConfig {
        SyncConfig::default()
    }

    #[tokio::test(start_paused = true)]
    async fn polling_relaxes_when_idle() {
        let store = Arc::new(CountingStore::default());
        let aggregator = Arc::new(UnreadAggregator::new(
            store.clone(),
            Some(admin()),
            Duration::from_millis(300),
        ));
        let inbox = AdminInbox::spawn(admin(), store.clone(), aggregator, &config());

        // Active phase: ten polls in the first five minutes.
        tokio::time::sleep(Duration::from_secs(301)).await;
        assert_eq!(store.lists.load(Ordering::SeqCst), 10);
        assert!(inbox.is_idle());

        // Idle phase: one poll per minute.
        let before = store.lists.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(store.lists.load(Ordering::SeqCst), before + 2);
    }

    #[tokio::test(start_paused = true)]
    async fn activity_restores_the_active_cadence() {
        let store = Arc::new(CountingStore::default());
        let aggregator = Arc::new(UnreadAggregator::new(
            store.clone(),
            Some(admin()),
            Duration::from_millis(300),
        ));
        let inbox = AdminInbox::spawn(admin(), store.clone(), aggregator, &config());

        tokio::time::sleep(Duration::from_secs(301)).await;
        assert!(inbox.is_idle());

        inbox.record_activity();
        assert!(!inbox.is_idle());

        // The in-flight idle sleep still lands at t=360; from there the
        // poller is back on the 30 s cadence (390, 420).
        let before = store.lists.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(store.lists.load(Ordering::SeqCst), before + 3);
    }
}
