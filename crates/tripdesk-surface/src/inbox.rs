use std::sync::Arc;

use tripdesk_store::{MessageStore, Result};
use tripdesk_types::{Observer, Thread};
use tripdesk_unread::ReadPositionTracker;

use crate::view::ViewState;

/// Full-page message list controller.
///
/// Unlike the popup, the primary list fetch here powers visible content, so
/// [`load`](InboxPage::load) propagates its error for the page to display.
/// Selection credits the read immediately, and an observer whose inbox
/// holds exactly one thread gets it opened for them on load.
pub struct InboxPage {
    observer: Observer,
    store: Arc<dyn MessageStore>,
    tracker: Arc<ReadPositionTracker>,
    threads: Vec<Thread>,
    selected: Option<Selected>,
}

struct Selected {
    thread_id: String,
    state: ViewState,
}

impl InboxPage {
    pub fn new(
        observer: Observer,
        store: Arc<dyn MessageStore>,
        tracker: Arc<ReadPositionTracker>,
    ) -> Self {
        Self {
            observer,
            store,
            tracker,
            threads: Vec::new(),
            selected: None,
        }
    }

    /// Fetch the thread list. With exactly one thread in the inbox it is
    /// auto-selected, which also credits it as read.
    pub async fn load(&mut self) -> Result<()> {
        self.threads = self.store.list_threads(&self.observer).await?;

        if self.threads.len() == 1 && self.selected.is_none() {
            let only = self.threads[0].id.clone();
            self.select_thread(&only).await;
        }
        Ok(())
    }

    /// Select a thread; the read position advances right away with the last
    /// message currently in the thread. A thread id not present in the
    /// loaded list is ignored.
    pub async fn select_thread(&mut self, thread_id: &str) {
        let Some(thread) = self.threads.iter().find(|t| t.id == thread_id) else {
            tracing::debug!(thread_id, "selection ignored; thread not in loaded list");
            return;
        };
        let last_message_id = thread.last_message_id();

        self.selected = Some(Selected {
            thread_id: thread_id.to_string(),
            state: ViewState::OpenUnseen,
        });

        if self.tracker.mark_as_read(thread_id, &last_message_id).await {
            if let Some(selected) = self.selected.as_mut() {
                if selected.thread_id == thread_id {
                    selected.state = ViewState::OpenSeen;
                }
            }
        }
    }

    /// Leave the selected thread.
    pub fn deselect(&mut self) {
        self.selected = None;
    }

    pub fn threads(&self) -> &[Thread] {
        &self.threads
    }

    pub fn selected_thread(&self) -> Option<&str> {
        self.selected.as_ref().map(|s| s.thread_id.as_str())
    }

    pub fn view_state(&self, thread_id: &str) -> ViewState {
        match self.selected.as_ref() {
            Some(s) if s.thread_id == thread_id => s.state,
            _ => ViewState::Closed,
        }
    }
}
