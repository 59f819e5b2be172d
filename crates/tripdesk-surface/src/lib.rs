//! Headless chat surfaces for the TripDesk support chat.
//!
//! No rendering happens here. Each surface is a controller holding exactly
//! the state a view layer needs — the thread list, the active thread and its
//! [`ViewState`] — plus the read-credit behavior the UX calls for:
//!
//! - [`ChatPopup`] — the floating widget. Opening a thread does not count
//!   as reading it; the position advances only after the dwell delay.
//! - [`InboxPage`] — the full-page list. Selecting a thread credits the
//!   read immediately, and an observer with exactly one thread gets it
//!   auto-opened on load.
//! - [`AdminInbox`] — staff view over all threads with adaptive polling.
//!
//! Surfaces are handed out by [`ChatSession`], the explicit per-sign-in
//! context that owns the unread machinery and tears it down on drop.

mod admin;
mod inbox;
mod popup;
mod session;
mod view;

pub use admin::AdminInbox;
pub use inbox::InboxPage;
pub use popup::ChatPopup;
pub use session::{ChatSession, ChatSessionBuilder};
pub use view::{ReadCreditPolicy, ViewState};
