//! Prelude module for convenient imports
//!
//! Import everything you need with:
//! ```rust
//! use tripdesk::prelude::*;
//! ```

pub use crate::{
    ChangeEvent, Observer, Reply, Sender, SenderRole, Thread, ThreadStatus,
    EventSource, HttpStore, MemoryStore, MessageStore, StoreError,
    CacheUpdate, ReadPositionCache, ReadPositionTracker, SyncConfig, UnreadAggregator,
    AdminInbox, ChatPopup, ChatSession, ChatSessionBuilder, InboxPage, ReadCreditPolicy,
    ViewState,
};
