use serde::{Deserialize, Serialize};

use crate::ThreadStatus;

/// Change notifications delivered on the push channel.
///
/// Every event names its payload explicitly; subscribers deserialize at the
/// channel boundary and drop frames that fail validation, so nothing
/// downstream ever inspects an opaque blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeEvent {
    /// A new thread was opened.
    ThreadCreated { thread_id: String },
    /// A reply was appended to an existing thread.
    ReplyAdded {
        thread_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        reply_id: Option<String>,
    },
    /// Thread subject/body was edited.
    ThreadEdited { thread_id: String },
    /// Thread was removed.
    ThreadDeleted { thread_id: String },
    /// Thread moved to a new lifecycle status.
    StatusChanged {
        thread_id: String,
        status: ThreadStatus,
    },
    /// The visible thread list changed in some unspecified way.
    ListUpdated,
    /// Explicit "recompute your unread count" signal.
    RefreshUnread,
}

impl ChangeEvent {
    /// The thread this event concerns, when it concerns exactly one.
    pub fn thread_id(&self) -> Option<&str> {
        match self {
            ChangeEvent::ThreadCreated { thread_id }
            | ChangeEvent::ReplyAdded { thread_id, .. }
            | ChangeEvent::ThreadEdited { thread_id }
            | ChangeEvent::ThreadDeleted { thread_id }
            | ChangeEvent::StatusChanged { thread_id, .. } => Some(thread_id),
            ChangeEvent::ListUpdated | ChangeEvent::RefreshUnread => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_use_snake_case_tags() {
        let event = ChangeEvent::ReplyAdded {
            thread_id: "t-1".to_string(),
            reply_id: Some("r-9".to_string()),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"reply_added""#));

        let back: ChangeEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn status_change_carries_the_new_status() {
        let json = r#"{"type":"status_changed","thread_id":"t-2","status":"closed"}"#;
        let event: ChangeEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            ChangeEvent::StatusChanged {
                thread_id: "t-2".to_string(),
                status: ThreadStatus::Closed,
            }
        );
    }

    #[test]
    fn unknown_event_tags_fail_validation() {
        let json = r#"{"type":"cart_updated","thread_id":"t-3"}"#;
        assert!(serde_json::from_str::<ChangeEvent>(json).is_err());
    }

    #[test]
    fn thread_id_accessor() {
        let event = ChangeEvent::ThreadDeleted {
            thread_id: "t-4".to_string(),
        };
        assert_eq!(event.thread_id(), Some("t-4"));
        assert_eq!(ChangeEvent::ListUpdated.thread_id(), None);
    }
}
