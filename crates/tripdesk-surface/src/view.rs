use std::time::Duration;

/// Client-side state of one thread within a surface.
///
/// `Closed -> OpenUnseen -> OpenSeen`, forward only; getting back to
/// `OpenUnseen` requires leaving the thread and re-opening it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Closed,
    /// Opened but not yet credited as read.
    OpenUnseen,
    /// Credited as read; `mark_as_read` fired with the last message at the
    /// moment of the transition.
    OpenSeen,
}

/// When an opened thread is credited as read.
///
/// The two surfaces deliberately differ: a popup renders over whatever the
/// user was doing, so a glance should not count — it dwells. Selecting a
/// thread on the full inbox page is a deliberate act and credits
/// immediately. Both are constructor arguments, so an embedder preferring a
/// single policy sets it in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadCreditPolicy {
    /// Credit as soon as the thread is selected.
    Immediate,
    /// Credit after the thread has stayed open this long.
    Dwell(Duration),
}
