use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::StreamExt;
use tokio::sync::watch;

use tripdesk_store::{EventSource, MessageStore};
use tripdesk_types::Observer;
use tripdesk_unread::{
    ChangeNotifier, ReadPositionCache, ReadPositionTracker, SyncConfig, UnreadAggregator,
};

use crate::admin::AdminInbox;
use crate::inbox::InboxPage;
use crate::popup::ChatPopup;
use crate::view::ReadCreditPolicy;

/// Per-sign-in chat context.
///
/// Built explicitly when the observer signs in and dropped at sign-out; it
/// owns the read-position cache, the tracker, the aggregator and the
/// notifier tasks, and hands out surface controllers wired to them. There
/// is deliberately no ambient/global instance anywhere — whoever needs the
/// session gets it passed in.
///
/// Must be built inside a tokio runtime (background tasks are spawned).
pub struct ChatSession {
    observer: Observer,
    store: Arc<dyn MessageStore>,
    tracker: Arc<ReadPositionTracker>,
    aggregator: Arc<UnreadAggregator>,
    notifier: ChangeNotifier,
    config: SyncConfig,
}

impl ChatSession {
    pub fn builder() -> ChatSessionBuilder {
        ChatSessionBuilder::new()
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }

    /// Watch channel over the observer's unread count.
    pub fn unread_counts(&self) -> watch::Receiver<u64> {
        self.aggregator.subscribe()
    }

    pub fn unread_now(&self) -> u64 {
        self.aggregator.current()
    }

    /// Explicit, user-visible refresh; never debounced.
    pub async fn refresh(&self) {
        self.aggregator.refresh().await;
    }

    /// The hosting window regained visibility.
    pub fn wake(&self) {
        self.notifier.wake();
    }

    /// Floating popup surface with the default dwell read-credit policy.
    pub fn popup(&self) -> ChatPopup {
        self.popup_with_policy(ReadCreditPolicy::Dwell(self.config.view_delay))
    }

    pub fn popup_with_policy(&self, policy: ReadCreditPolicy) -> ChatPopup {
        ChatPopup::new(
            self.observer.clone(),
            self.store.clone(),
            self.tracker.clone(),
            &self.config,
            policy,
        )
    }

    /// Full-page inbox surface (immediate read credit).
    pub fn inbox(&self) -> InboxPage {
        InboxPage::new(
            self.observer.clone(),
            self.store.clone(),
            self.tracker.clone(),
        )
    }

    /// Adaptive-poll staff inbox. Meaningful for agent/admin observers;
    /// a traveler gets their own (single-thread-filtered) view of it.
    pub fn admin_inbox(&self) -> AdminInbox {
        AdminInbox::spawn(
            self.observer.clone(),
            self.store.clone(),
            self.aggregator.clone(),
            &self.config,
        )
    }

    pub fn tracker(&self) -> &ReadPositionTracker {
        &self.tracker
    }
}

/// Builder for [`ChatSession`]; observer, store and cache directory are
/// required, the event source is optional (polling covers its absence).
pub struct ChatSessionBuilder {
    observer: Option<Observer>,
    store: Option<Arc<dyn MessageStore>>,
    events: Option<Arc<dyn EventSource>>,
    cache_dir: Option<PathBuf>,
    config: SyncConfig,
}

impl ChatSessionBuilder {
    pub fn new() -> Self {
        Self {
            observer: None,
            store: None,
            events: None,
            cache_dir: None,
            config: SyncConfig::default(),
        }
    }

    pub fn observer(mut self, observer: Observer) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn store(mut self, store: Arc<dyn MessageStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn events(mut self, events: Arc<dyn EventSource>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    pub fn config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<ChatSession> {
        let observer = self.observer.context("observer is required")?;
        let store = self.store.context("store is required")?;
        let cache_dir = self.cache_dir.context("cache_dir is required")?;
        let config = self.config;

        let cache = Arc::new(ReadPositionCache::open(&cache_dir)?);
        let tracker = Arc::new(ReadPositionTracker::new(
            observer.clone(),
            store.clone(),
            cache.clone(),
        ));
        let aggregator = Arc::new(UnreadAggregator::new(
            store.clone(),
            Some(observer.clone()),
            config.debounce_window,
        ));

        let events = match &self.events {
            Some(source) => source.subscribe(),
            None => futures::stream::pending().boxed(),
        };
        let notifier =
            ChangeNotifier::spawn(aggregator.clone(), events, cache.subscribe(), &config);

        tracing::info!(observer = %observer.id, role = %observer.role, "chat session started");

        Ok(ChatSession {
            observer,
            store,
            tracker,
            aggregator,
            notifier,
            config,
        })
    }
}

impl Default for ChatSessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
