//! Message log.
//!
//! Records are kept unordered; listings sort at read time. An officer's own
//! thread reads oldest first, the dispatch-wide feed newest first.

use std::collections::HashMap;

use parking_lot::RwLock;
use relay_core::{MessageId, MessageRecord, OfficerId, RelayError, Result};
use tracing::debug;

/// Message and response records.
pub trait MessageLog: Send + Sync {
    /// Store a record under its id.
    fn append(&self, message: MessageRecord);

    /// Look up one record.
    fn get(&self, id: &MessageId) -> Option<MessageRecord>;

    /// An officer's thread, oldest first.
    fn list_by_officer(&self, officer_id: &OfficerId) -> Vec<MessageRecord>;

    /// Every record, newest first.
    fn list_all(&self) -> Vec<MessageRecord>;

    /// Set `read` on a record. Marking an already-read record is a no-op.
    fn mark_read(&self, id: &MessageId) -> Result<()>;
}

/// [`MessageLog`] backed by a locked `HashMap`.
#[derive(Default)]
pub struct InMemoryMessageLog {
    messages: RwLock<HashMap<MessageId, MessageRecord>>,
}

impl InMemoryMessageLog {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.read().is_empty()
    }
}

fn chronological(a: &MessageRecord, b: &MessageRecord) -> std::cmp::Ordering {
    a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id))
}

impl MessageLog for InMemoryMessageLog {
    fn append(&self, message: MessageRecord) {
        debug!(
            message_id = %message.id,
            officer_id = %message.officer_id,
            from_dispatch = message.from_dispatch,
            "message appended"
        );
        let _ = self.messages.write().insert(message.id.clone(), message);
    }

    fn get(&self, id: &MessageId) -> Option<MessageRecord> {
        self.messages.read().get(id).cloned()
    }

    fn list_by_officer(&self, officer_id: &OfficerId) -> Vec<MessageRecord> {
        let mut thread: Vec<MessageRecord> = self
            .messages
            .read()
            .values()
            .filter(|m| &m.officer_id == officer_id)
            .cloned()
            .collect();
        thread.sort_by(chronological);
        thread
    }

    fn list_all(&self) -> Vec<MessageRecord> {
        let mut feed: Vec<MessageRecord> = self.messages.read().values().cloned().collect();
        feed.sort_by(|a, b| chronological(b, a));
        feed
    }

    fn mark_read(&self, id: &MessageId) -> Result<()> {
        let mut messages = self.messages.write();
        let message = messages
            .get_mut(id)
            .ok_or_else(|| RelayError::MessageNotFound(id.clone()))?;
        message.read = true;
        Ok(())
    }
}
