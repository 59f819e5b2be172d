//! Request/response bodies shared by [`HttpStore`](crate::HttpStore) and the
//! reference API server, so the two sides cannot drift apart.

use serde::{Deserialize, Serialize};

use tripdesk_types::{Observer, SenderRole, Thread, ThreadStatus};

/// Identity fields carried as query parameters on observer-scoped reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObserverQuery {
    pub observer_id: String,
    pub role: SenderRole,
    #[serde(default)]
    pub display_name: String,
}

impl ObserverQuery {
    pub fn observer(&self) -> Observer {
        Observer::new(self.observer_id.clone(), self.display_name.clone(), self.role)
    }
}

impl From<&Observer> for ObserverQuery {
    fn from(observer: &Observer) -> Self {
        Self {
            observer_id: observer.id.clone(),
            role: observer.role,
            display_name: observer.display_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateThreadRequest {
    pub observer: Observer,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddReplyRequest {
    pub observer: Observer,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ThreadStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignRequest {
    pub staff_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadListResponse {
    pub threads: Vec<Thread>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnreadCountResponse {
    pub unread: u64,
}
