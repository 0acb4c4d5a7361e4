//! Message records held by the message log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{MessageId, OfficerId};

/// A dispatch message or an officer's response to one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Log id.
    pub id: MessageId,
    /// Officer the thread belongs to.
    pub officer_id: OfficerId,
    /// `true` when dispatch wrote it, `false` for officer responses.
    pub from_dispatch: bool,
    /// Message body.
    pub content: String,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
    /// Set once a response referencing this message exists.
    pub read: bool,
    /// The message this one answers, for responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_response_to: Option<MessageId>,
}

impl MessageRecord {
    /// A new unread message from dispatch to an officer.
    #[must_use]
    pub fn from_dispatch(officer_id: OfficerId, content: String) -> Self {
        Self {
            id: MessageId::generate(),
            officer_id,
            from_dispatch: true,
            content,
            timestamp: Utc::now(),
            read: false,
            in_response_to: None,
        }
    }

    /// A new officer response answering `original`.
    #[must_use]
    pub fn response_to(original: &MessageRecord, content: String) -> Self {
        Self {
            id: MessageId::generate(),
            officer_id: original.officer_id.clone(),
            from_dispatch: false,
            content,
            timestamp: Utc::now(),
            read: false,
            in_response_to: Some(original.id.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_message_is_unread() {
        let msg = MessageRecord::from_dispatch(OfficerId::from("o1"), "check in".into());
        assert!(msg.from_dispatch);
        assert!(!msg.read);
        assert!(msg.in_response_to.is_none());
    }

    #[test]
    fn response_inherits_officer_and_references_original() {
        let original = MessageRecord::from_dispatch(OfficerId::from("o1"), "status?".into());
        let reply = MessageRecord::response_to(&original, "all good".into());
        assert_eq!(reply.officer_id, original.officer_id);
        assert_eq!(reply.in_response_to.as_ref(), Some(&original.id));
        assert!(!reply.from_dispatch);
        assert_ne!(reply.id, original.id);
    }

    #[test]
    fn in_response_to_omitted_when_absent() {
        let msg = MessageRecord::from_dispatch(OfficerId::from("o1"), "hi".into());
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json.get("in_response_to").is_none());
        assert_eq!(json["officer_id"], "o1");
        assert_eq!(json["from_dispatch"], true);
    }
}
