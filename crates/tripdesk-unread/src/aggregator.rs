use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};

use tripdesk_store::MessageStore;
use tripdesk_types::Observer;

use crate::tasks::TaskGuard;

/// Publishes the authoritative unread count for one observer.
///
/// The count lives on a watch channel: subscribers always see the latest
/// fetched value, overlapping fetches resolve last-write-wins. Two refresh
/// paths exist on purpose — [`refresh`](UnreadAggregator::refresh) fetches
/// immediately (mount, explicit user refresh) while
/// [`refresh_debounced`](UnreadAggregator::refresh_debounced) coalesces
/// bursts of change events into a single request once the window goes
/// quiet.
///
/// Without a signed-in observer the aggregator is inert: the count stays 0
/// and no requests are ever issued.
pub struct UnreadAggregator {
    observer: Option<Observer>,
    store: Arc<dyn MessageStore>,
    count: Arc<watch::Sender<u64>>,
    triggers: Option<mpsc::UnboundedSender<()>>,
    _debouncer: Option<TaskGuard>,
}

impl UnreadAggregator {
    pub fn new(
        store: Arc<dyn MessageStore>,
        observer: Option<Observer>,
        debounce_window: Duration,
    ) -> Self {
        let count = Arc::new(watch::Sender::new(0));

        let Some(observer) = observer else {
            return Self {
                observer: None,
                store,
                count,
                triggers: None,
                _debouncer: None,
            };
        };

        let (triggers, trigger_rx) = mpsc::unbounded_channel();
        let debouncer = TaskGuard::spawn(debounce_loop(
            store.clone(),
            observer.clone(),
            count.clone(),
            trigger_rx,
            debounce_window,
        ));

        Self {
            observer: Some(observer),
            store,
            count,
            triggers: Some(triggers),
            _debouncer: Some(debouncer),
        }
    }

    /// Receiver over the published count; the current value is readable
    /// immediately.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.count.subscribe()
    }

    pub fn current(&self) -> u64 {
        *self.count.borrow()
    }

    /// Fetch and publish now. Used for the mount fetch and user-visible
    /// refreshes, which must not wait out a debounce window.
    pub async fn refresh(&self) {
        let Some(observer) = &self.observer else {
            return;
        };
        fetch_and_publish(self.store.as_ref(), observer, &self.count).await;
    }

    /// Request a refresh through the debouncer. Triggers landing within the
    /// quiet window supersede pending ones instead of issuing duplicate
    /// requests.
    pub fn refresh_debounced(&self) {
        if let Some(triggers) = &self.triggers {
            let _ = triggers.send(());
        }
    }
}

async fn debounce_loop(
    store: Arc<dyn MessageStore>,
    observer: Observer,
    count: Arc<watch::Sender<u64>>,
    mut triggers: mpsc::UnboundedReceiver<()>,
    window: Duration,
) {
    while triggers.recv().await.is_some() {
        // Every further trigger restarts the quiet window; one fetch covers
        // the whole burst.
        loop {
            match tokio::time::timeout(window, triggers.recv()).await {
                Ok(Some(())) => continue,
                Ok(None) => return,
                Err(_) => break,
            }
        }
        fetch_and_publish(store.as_ref(), &observer, &count).await;
    }
}

async fn fetch_and_publish(
    store: &dyn MessageStore,
    observer: &Observer,
    count: &watch::Sender<u64>,
) {
    match store.unread_count(observer).await {
        Ok(n) => {
            let _ = count.send(n);
        }
        Err(e) => {
            // Keep the previous count; no flash-to-zero on a failed fetch.
            tracing::debug!(error = %e, "unread count refresh failed");
        }
    }
}
