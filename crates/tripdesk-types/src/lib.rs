//! Core types for the TripDesk support chat.
//!
//! This crate holds the domain model shared by every other TripDesk crate:
//! threads, replies, sender roles, the signed-in observer, and the typed
//! change events delivered on the push channel. It also owns the single
//! authoritative unread-counting routine ([`Thread::unread_for`]) so that
//! the reference backend and the in-memory store can never disagree on what
//! "unread" means.

mod events;
mod thread;

pub use events::ChangeEvent;
pub use thread::{Observer, Reply, Sender, SenderRole, Thread, ThreadStatus};
