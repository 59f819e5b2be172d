use std::sync::{Arc, Mutex};

use tripdesk_store::MessageStore;
use tripdesk_types::{Observer, Thread};
use tripdesk_unread::{ReadPositionTracker, SyncConfig, TaskGuard};

use crate::view::{ReadCreditPolicy, ViewState};

/// Floating chat popup controller.
///
/// While open, the thread list is re-fetched on a short poll so the view
/// stays close to live even between push events. Selecting a thread starts
/// the read-credit policy; with the default dwell policy the position only
/// advances if the thread is still the active one when the delay elapses.
pub struct ChatPopup {
    observer: Observer,
    store: Arc<dyn MessageStore>,
    tracker: Arc<ReadPositionTracker>,
    policy: ReadCreditPolicy,
    poll_period: std::time::Duration,
    shared: Arc<PopupShared>,
    is_open: bool,
    poll: Option<TaskGuard>,
    credit: Option<TaskGuard>,
}

struct PopupShared {
    threads: Mutex<Vec<Thread>>,
    active: Mutex<Option<ActiveThread>>,
}

struct ActiveThread {
    thread_id: String,
    state: ViewState,
}

impl ChatPopup {
    pub fn new(
        observer: Observer,
        store: Arc<dyn MessageStore>,
        tracker: Arc<ReadPositionTracker>,
        config: &SyncConfig,
        policy: ReadCreditPolicy,
    ) -> Self {
        Self {
            observer,
            store,
            tracker,
            policy,
            poll_period: config.popup_poll,
            shared: Arc::new(PopupShared {
                threads: Mutex::new(Vec::new()),
                active: Mutex::new(None),
            }),
            is_open: false,
            poll: None,
            credit: None,
        }
    }

    /// Open the popup: fetch the thread list and start the list poll.
    ///
    /// A failed initial fetch leaves the previous (possibly empty) list in
    /// place; the poll retries on its own.
    pub async fn open(&mut self) {
        if self.is_open {
            return;
        }
        self.is_open = true;

        refresh_threads(self.store.as_ref(), &self.observer, &self.shared).await;

        let store = self.store.clone();
        let observer = self.observer.clone();
        let shared = self.shared.clone();
        let period = self.poll_period;
        self.poll = Some(TaskGuard::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await; // the open() fetch covered this instant
            loop {
                ticker.tick().await;
                refresh_threads(store.as_ref(), &observer, &shared).await;
            }
        }));
    }

    /// Close the popup; cancels the poll and any pending read credit.
    pub fn close(&mut self) {
        self.is_open = false;
        self.poll = None;
        self.credit = None;
        *self.shared.active.lock().unwrap() = None;
    }

    /// Select a thread inside the popup. The thread transitions to
    /// `OpenUnseen`; the credit policy decides when (and whether) it
    /// reaches `OpenSeen`.
    pub async fn select_thread(&mut self, thread_id: &str) {
        // A pending credit for the previously selected thread is void.
        self.credit = None;
        *self.shared.active.lock().unwrap() = Some(ActiveThread {
            thread_id: thread_id.to_string(),
            state: ViewState::OpenUnseen,
        });

        match self.policy {
            ReadCreditPolicy::Immediate => {
                credit_active(&self.shared, &self.tracker, thread_id).await;
            }
            ReadCreditPolicy::Dwell(delay) => {
                let shared = self.shared.clone();
                let tracker = self.tracker.clone();
                let thread_id = thread_id.to_string();
                self.credit = Some(TaskGuard::spawn(async move {
                    tokio::time::sleep(delay).await;
                    credit_active(&shared, &tracker, &thread_id).await;
                }));
            }
        }
    }

    /// Leave the active thread without closing the popup.
    pub fn deselect(&mut self) {
        self.credit = None;
        *self.shared.active.lock().unwrap() = None;
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Current snapshot of the popup's thread list.
    pub fn threads(&self) -> Vec<Thread> {
        self.shared.threads.lock().unwrap().clone()
    }

    /// View state of `thread_id` as this popup sees it.
    pub fn view_state(&self, thread_id: &str) -> ViewState {
        let active = self.shared.active.lock().unwrap();
        match active.as_ref() {
            Some(a) if a.thread_id == thread_id => a.state,
            _ => ViewState::Closed,
        }
    }
}

async fn refresh_threads(store: &dyn MessageStore, observer: &Observer, shared: &PopupShared) {
    match store.list_threads(observer).await {
        Ok(threads) => *shared.threads.lock().unwrap() = threads,
        Err(e) => tracing::debug!(error = %e, "popup thread list refresh failed"),
    }
}

/// Credit the active thread as read, using the last message in the local
/// snapshot at this moment. Skips quietly if the selection changed or the
/// thread is gone from the snapshot.
async fn credit_active(shared: &PopupShared, tracker: &ReadPositionTracker, thread_id: &str) {
    let last_message_id = {
        let threads = shared.threads.lock().unwrap();
        match threads.iter().find(|t| t.id == thread_id) {
            Some(thread) => thread.last_message_id(),
            None => {
                tracing::debug!(thread_id, "thread missing from snapshot; skipping read credit");
                return;
            }
        }
    };

    {
        let active = shared.active.lock().unwrap();
        if !matches!(active.as_ref(), Some(a) if a.thread_id == thread_id) {
            return;
        }
    }

    if tracker.mark_as_read(thread_id, &last_message_id).await {
        let mut active = shared.active.lock().unwrap();
        if let Some(a) = active.as_mut() {
            if a.thread_id == thread_id {
                a.state = ViewState::OpenSeen;
            }
        }
    }
}
