//! Message-store boundary for TripDesk.
//!
//! The unread machinery never talks to a database; it talks to *some*
//! authoritative store through the [`MessageStore`] trait and receives change
//! notifications through [`EventSource`]. Two implementations live here:
//!
//! - [`HttpStore`] — reqwest client against the TripDesk API endpoints,
//!   with the push channel consumed as a Server-Sent Events stream.
//! - [`MemoryStore`] — in-memory store with the same observable semantics
//!   (monotonic read receipts, role-filtered visibility, broadcast push
//!   channel). Backs the reference API server and the test suites.

mod client;
mod error;
mod http;
mod memory;
mod sse;
pub mod wire;

pub use client::{EventSource, MessageStore};
pub use error::{Result, StoreError};
pub use http::HttpStore;
pub use memory::MemoryStore;
