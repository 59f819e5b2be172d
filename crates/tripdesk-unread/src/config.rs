use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing knobs for the unread machinery.
///
/// Defaults mirror the production web client: 300 ms debounce on
/// event-triggered recomputes, 60 s fallback poll, 10 s popup list poll,
/// 2 s popup dwell before a thread counts as read, and an admin inbox that
/// relaxes from 30 s to 60 s polling after 5 minutes without activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Quiet window for coalescing event-triggered refreshes.
    pub debounce_window: Duration,
    /// Low-frequency refresh covering missed events.
    pub fallback_poll: Duration,
    /// Thread-list poll while the popup is open.
    pub popup_poll: Duration,
    /// How long a thread must stay open in the popup before it is credited
    /// as read.
    pub view_delay: Duration,
    /// Admin inbox poll while the operator is active.
    pub admin_active_poll: Duration,
    /// Admin inbox poll once the operator has gone idle.
    pub admin_idle_poll: Duration,
    /// Inactivity span after which the admin inbox is considered idle.
    pub admin_idle_after: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce_window: Duration::from_millis(300),
            fallback_poll: Duration::from_secs(60),
            popup_poll: Duration::from_secs(10),
            view_delay: Duration::from_secs(2),
            admin_active_poll: Duration::from_secs(30),
            admin_idle_poll: Duration::from_secs(60),
            admin_idle_after: Duration::from_secs(300),
        }
    }
}

impl SyncConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debounce_window(mut self, window: Duration) -> Self {
        self.debounce_window = window;
        self
    }

    pub fn with_fallback_poll(mut self, period: Duration) -> Self {
        self.fallback_poll = period;
        self
    }

    pub fn with_view_delay(mut self, delay: Duration) -> Self {
        self.view_delay = delay;
        self
    }
}
