use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which side of the support desk a message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderRole {
    /// End-user booking flights/hotels/cars.
    Traveler,
    /// Support agent handling threads.
    Agent,
    /// Platform administrator.
    Admin,
}

impl SenderRole {
    pub fn is_staff(&self) -> bool {
        matches!(self, SenderRole::Agent | SenderRole::Admin)
    }

    /// Whether a message sent by `self` counts as unread for `observer`.
    ///
    /// Only messages from the other side of the desk count: staff replies
    /// count against a traveler, traveler messages count against staff.
    pub fn counts_against(&self, observer: SenderRole) -> bool {
        self.is_staff() != observer.is_staff()
    }
}

impl std::fmt::Display for SenderRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SenderRole::Traveler => write!(f, "traveler"),
            SenderRole::Agent => write!(f, "agent"),
            SenderRole::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for SenderRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "traveler" => Ok(SenderRole::Traveler),
            "agent" => Ok(SenderRole::Agent),
            "admin" => Ok(SenderRole::Admin),
            other => Err(format!("unknown sender role: {}", other)),
        }
    }
}

/// Lifecycle of a support thread. Closed threads accept no further replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadStatus {
    Pending,
    Accepted,
    Resolved,
    Closed,
}

impl ThreadStatus {
    pub fn accepts_replies(&self) -> bool {
        !matches!(self, ThreadStatus::Closed)
    }
}

impl std::fmt::Display for ThreadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThreadStatus::Pending => write!(f, "pending"),
            ThreadStatus::Accepted => write!(f, "accepted"),
            ThreadStatus::Resolved => write!(f, "resolved"),
            ThreadStatus::Closed => write!(f, "closed"),
        }
    }
}

/// Attribution attached to a thread or reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sender {
    pub id: String,
    pub display_name: String,
    pub role: SenderRole,
}

impl Sender {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, role: SenderRole) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            role,
        }
    }
}

/// The signed-in identity whose unread count is being computed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observer {
    pub id: String,
    pub display_name: String,
    pub role: SenderRole,
}

impl Observer {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, role: SenderRole) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            role,
        }
    }

    pub fn as_sender(&self) -> Sender {
        Sender::new(self.id.clone(), self.display_name.clone(), self.role)
    }
}

/// One message within a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply {
    /// Store-assigned identifier. The reference backend always assigns one;
    /// `None` only ever comes from foreign stores.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub sender: Sender,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<DateTime<Utc>>,
}

impl Reply {
    /// The reply's identifier, synthesizing `{threadId}-reply-{index}` when
    /// the store supplied none. The synthesized form assumes stable reply
    /// ordering and exists only as a defensive fallback.
    pub fn effective_id(&self, thread_id: &str, index: usize) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => format!("{}-reply-{}", thread_id, index),
        }
    }
}

/// One support conversation: an opening message plus ordered replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    /// Originating sender; the opening message is attributed to them.
    pub sender: Sender,
    pub subject: String,
    pub body: String,
    pub status: ThreadStatus,
    /// Insertion order is chronological and significant.
    #[serde(default)]
    pub replies: Vec<Reply>,
    /// Staff identity handling the thread, if assigned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Thread {
    /// Identifier of the newest message: the last reply, or the opening
    /// message (the thread id) when no replies exist.
    pub fn last_message_id(&self) -> String {
        match self.replies.last() {
            Some(reply) => reply.effective_id(&self.id, self.replies.len() - 1),
            None => self.id.clone(),
        }
    }

    /// Timestamp of the newest message in the thread.
    pub fn last_activity_at(&self) -> DateTime<Utc> {
        self.replies
            .last()
            .map(|r| r.created_at)
            .unwrap_or(self.created_at)
    }

    /// Per-thread reconciliation: how many messages from the other side of
    /// the desk were created strictly after `read_horizon`.
    ///
    /// `read_horizon` is the observer's authoritative read position for this
    /// thread (`None` = never opened). Read positions only ever advance, so
    /// callers can feed the stored horizon straight in.
    pub fn unread_for(&self, observer: SenderRole, read_horizon: Option<DateTime<Utc>>) -> usize {
        let unseen = |at: DateTime<Utc>| match read_horizon {
            Some(horizon) => at > horizon,
            None => true,
        };

        let mut count = 0;
        if self.sender.role.counts_against(observer) && unseen(self.created_at) {
            count += 1;
        }
        count += self
            .replies
            .iter()
            .filter(|r| r.sender.role.counts_against(observer) && unseen(r.created_at))
            .count();
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn traveler() -> Sender {
        Sender::new("u-1", "Ana", SenderRole::Traveler)
    }

    fn agent() -> Sender {
        Sender::new("a-1", "Sam", SenderRole::Agent)
    }

    fn reply(sender: Sender, at: DateTime<Utc>) -> Reply {
        Reply {
            id: Some(format!("r-{}", at.timestamp_millis())),
            sender,
            content: "hello".to_string(),
            attachments: Vec::new(),
            created_at: at,
            edited_at: None,
        }
    }

    fn thread_with(replies: Vec<Reply>) -> Thread {
        let base = Utc::now() - Duration::minutes(60);
        Thread {
            id: "t-1".to_string(),
            sender: traveler(),
            subject: "Refund for cancelled flight".to_string(),
            body: "My flight was cancelled".to_string(),
            status: ThreadStatus::Pending,
            replies,
            assigned_to: None,
            created_at: base,
            updated_at: base,
        }
    }

    #[test]
    fn counts_against_is_cross_desk_only() {
        assert!(SenderRole::Agent.counts_against(SenderRole::Traveler));
        assert!(SenderRole::Admin.counts_against(SenderRole::Traveler));
        assert!(SenderRole::Traveler.counts_against(SenderRole::Agent));
        assert!(!SenderRole::Traveler.counts_against(SenderRole::Traveler));
        assert!(!SenderRole::Agent.counts_against(SenderRole::Admin));
    }

    #[test]
    fn unread_counts_other_side_after_horizon() {
        let now = Utc::now();
        let thread = thread_with(vec![
            reply(agent(), now - Duration::minutes(30)),
            reply(traveler(), now - Duration::minutes(20)),
            reply(agent(), now - Duration::minutes(10)),
            reply(agent(), now - Duration::minutes(5)),
        ]);

        // Never opened: opening message is the observer's own, three agent
        // replies are unread.
        assert_eq!(thread.unread_for(SenderRole::Traveler, None), 3);

        // Horizon at the traveler's own reply: the last two agent replies
        // remain unread.
        let horizon = now - Duration::minutes(20);
        assert_eq!(thread.unread_for(SenderRole::Traveler, Some(horizon)), 2);

        // Horizon at the last message: nothing unread regardless of roles
        // earlier in the thread.
        let horizon = now - Duration::minutes(5);
        assert_eq!(thread.unread_for(SenderRole::Traveler, Some(horizon)), 0);
    }

    #[test]
    fn unread_for_staff_counts_traveler_messages() {
        let now = Utc::now();
        let thread = thread_with(vec![
            reply(agent(), now - Duration::minutes(30)),
            reply(traveler(), now - Duration::minutes(10)),
        ]);

        // Opening traveler message + their later reply.
        assert_eq!(thread.unread_for(SenderRole::Agent, None), 2);
        assert_eq!(thread.unread_for(SenderRole::Admin, None), 2);
    }

    #[test]
    fn last_message_id_falls_back_to_thread_id() {
        let thread = thread_with(Vec::new());
        assert_eq!(thread.last_message_id(), "t-1");
    }

    #[test]
    fn last_message_id_synthesizes_when_reply_has_none() {
        let now = Utc::now();
        let mut anon = reply(agent(), now);
        anon.id = None;
        let thread = thread_with(vec![reply(agent(), now - Duration::minutes(1)), anon]);
        assert_eq!(thread.last_message_id(), "t-1-reply-1");
    }

    #[test]
    fn closed_threads_reject_replies() {
        assert!(ThreadStatus::Pending.accepts_replies());
        assert!(ThreadStatus::Accepted.accepts_replies());
        assert!(ThreadStatus::Resolved.accepts_replies());
        assert!(!ThreadStatus::Closed.accepts_replies());
    }

    #[test]
    fn role_round_trips_through_str() {
        for role in [SenderRole::Traveler, SenderRole::Agent, SenderRole::Admin] {
            let parsed: SenderRole = role.to_string().parse().unwrap();
            assert_eq!(parsed, role);
        }
        assert!("customer".parse::<SenderRole>().is_err());
    }
}
