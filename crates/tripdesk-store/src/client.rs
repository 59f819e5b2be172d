use async_trait::async_trait;
use futures::stream::BoxStream;

use tripdesk_types::{ChangeEvent, Observer, Reply, Thread, ThreadStatus};

use crate::error::Result;

/// Authoritative message store as seen from the client side.
///
/// Implementations must serialize concurrent writes per (observer, thread)
/// key and enforce read-receipt monotonicity: a receipt only ever advances,
/// so `mark_read` is idempotent and never regresses a position.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// All threads visible to the observer, replies included, in creation
    /// order. Travelers see the threads they originated; staff see all.
    async fn list_threads(&self, observer: &Observer) -> Result<Vec<Thread>>;

    /// Authoritative unread count for the observer, reconciled per thread
    /// against their read receipts.
    async fn unread_count(&self, observer: &Observer) -> Result<u64>;

    /// Record that the observer has read `thread_id` up to now.
    async fn mark_read(&self, observer: &Observer, thread_id: &str) -> Result<()>;

    /// Open a new thread authored by the observer.
    async fn create_thread(
        &self,
        observer: &Observer,
        subject: &str,
        body: &str,
    ) -> Result<Thread>;

    /// Append a reply authored by the observer. Fails with
    /// [`StoreError::ThreadClosed`](crate::StoreError::ThreadClosed) on
    /// closed threads.
    async fn add_reply(
        &self,
        observer: &Observer,
        thread_id: &str,
        content: &str,
    ) -> Result<Reply>;

    /// Move a thread to a new lifecycle status.
    async fn update_status(&self, thread_id: &str, status: ThreadStatus) -> Result<()>;

    /// Remove a thread. Read receipts for the pair are left in place; they
    /// are harmless once the thread is gone.
    async fn delete_thread(&self, thread_id: &str) -> Result<()>;

    /// Hand a thread to a staff identity.
    async fn assign(&self, thread_id: &str, staff_id: &str) -> Result<()>;
}

/// Push-event channel delivering [`ChangeEvent`]s to connected sessions.
///
/// The stream is infinite from the subscriber's point of view; transports
/// reconnect internally and simply go quiet while disconnected (the fallback
/// poll covers the gap).
pub trait EventSource: Send + Sync {
    fn subscribe(&self) -> BoxStream<'static, ChangeEvent>;
}
