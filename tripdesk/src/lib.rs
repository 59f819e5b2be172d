//! # TripDesk - Support-Chat Unread Tracking
//!
//! TripDesk keeps a travel platform's support-chat badge honest: it tracks
//! read positions per observer and thread, reconciles unread counts against
//! an authoritative backend, and keeps the number fresh through typed push
//! events with a polling fallback.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tripdesk::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Talk to the TripDesk API; MemoryStore works for tests.
//!     let store = Arc::new(HttpStore::new("http://localhost:8090")?);
//!
//!     // One session per sign-in; dropping it tears everything down.
//!     let session = ChatSession::builder()
//!         .observer(Observer::new("u-1", "Ana", SenderRole::Traveler))
//!         .store(store.clone())
//!         .events(store)
//!         .cache_dir("/tmp/tripdesk-cache")
//!         .build()?;
//!
//!     // The badge value, live.
//!     let mut counts = session.unread_counts();
//!     println!("unread: {}", *counts.borrow());
//!
//!     // Opening the popup and dwelling on a thread advances the read
//!     // position; the count follows.
//!     let mut popup = session.popup();
//!     popup.open().await;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! TripDesk consists of several composable crates:
//!
//! - **tripdesk-types**: Domain model (threads, replies, roles) and typed
//!   change events
//! - **tripdesk-store**: Store boundary — `MessageStore` trait, HTTP client
//!   with SSE push channel, in-memory reference store
//! - **tripdesk-unread**: Read-position cache and tracker, debounced unread
//!   aggregator, change notifier
//! - **tripdesk-surface**: Session context and headless surface controllers
//!   (popup, inbox page, admin inbox)
//!
//! The reference backend lives in `tripdesk-api` (not re-exported here).

pub use tripdesk_store::{
    EventSource, HttpStore, MemoryStore, MessageStore, StoreError,
};
pub use tripdesk_surface::{
    AdminInbox, ChatPopup, ChatSession, ChatSessionBuilder, InboxPage, ReadCreditPolicy,
    ViewState,
};
pub use tripdesk_types::{
    ChangeEvent, Observer, Reply, Sender, SenderRole, Thread, ThreadStatus,
};
pub use tripdesk_unread::{
    CacheUpdate, ChangeNotifier, ReadPositionCache, ReadPositionTracker, SyncConfig,
    UnreadAggregator,
};

pub mod prelude;
