//! Unread-count machinery for the TripDesk support chat.
//!
//! Four pieces cooperate here, wired together by a session context:
//!
//! - [`ReadPositionCache`] — durable local record of the last message an
//!   observer has seen per thread, for optimistic rendering before the
//!   authoritative state arrives. Writes fan out to other mounted surfaces
//!   over a broadcast channel.
//! - [`ReadPositionTracker`] — advances the read position: authoritative
//!   store first, local cache only after the remote write succeeds, so the
//!   cache is never fresher than the server.
//! - [`UnreadAggregator`] — publishes the authoritative unread count on a
//!   watch channel. Notifier-triggered recomputes are debounced; mount and
//!   user-visible refreshes are not.
//! - [`ChangeNotifier`] — background wiring that turns push events, the
//!   fallback poll, visibility changes and cross-surface cache updates into
//!   aggregator refreshes. Every task dies with the notifier.

mod aggregator;
mod cache;
mod config;
mod notifier;
mod tasks;
mod tracker;

pub use aggregator::UnreadAggregator;
pub use cache::{CacheUpdate, ReadPositionCache};
pub use config::SyncConfig;
pub use notifier::ChangeNotifier;
pub use tasks::TaskGuard;
pub use tracker::ReadPositionTracker;
