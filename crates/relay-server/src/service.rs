//! Relay operations shared by the HTTP routes and WebSocket sessions.
//!
//! Every mutation commits to the store first and routes afterwards. Routing
//! is best-effort, so an operation succeeds once its record is written
//! whether or not anyone was online to receive the push.

use std::sync::Arc;

use relay_core::{
    MessageId, MessageRecord, NewOfficer, OfficerId, OfficerRecord, OfficerStatus, RelayError,
    RelayEvent, Result,
};
use relay_store::{Directory, MessageLog};
use tracing::{debug, info};

use crate::websocket::broadcast::BroadcastRouter;
use crate::websocket::registry::ConnectionRegistry;

/// Officer directory, message log and router bundled behind one handle.
pub struct RelayService {
    directory: Arc<dyn Directory>,
    messages: Arc<dyn MessageLog>,
    router: BroadcastRouter,
}

impl RelayService {
    /// Build a service over the given stores, routing through `registry`.
    pub fn new(
        directory: Arc<dyn Directory>,
        messages: Arc<dyn MessageLog>,
        registry: Arc<ConnectionRegistry>,
    ) -> Self {
        Self {
            directory,
            messages,
            router: BroadcastRouter::new(registry),
        }
    }

    /// The router events go through.
    pub fn router(&self) -> &BroadcastRouter {
        &self.router
    }

    /// The live connection registry.
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        self.router.registry()
    }

    /// All officers, by name.
    pub fn list_officers(&self) -> Vec<OfficerRecord> {
        self.directory.list()
    }

    /// One officer.
    pub fn get_officer(&self, id: &OfficerId) -> Result<OfficerRecord> {
        self.directory
            .get(id)
            .ok_or_else(|| RelayError::OfficerNotFound(id.clone()))
    }

    /// Register a new officer with a server-assigned id.
    pub fn create_officer(&self, officer: NewOfficer) -> OfficerRecord {
        let record = self.directory.create(officer);
        info!(officer_id = %record.id, name = %record.name, "officer created");
        record
    }

    /// Insert officers with fixed ids, replacing any existing records.
    pub fn seed_officers(&self, officers: impl IntoIterator<Item = OfficerRecord>) -> usize {
        let mut count = 0;
        for officer in officers {
            debug!(officer_id = %officer.id, "seeding officer");
            self.directory.upsert(officer);
            count += 1;
        }
        count
    }

    /// Change an officer's status and tell every dispatch console.
    pub fn update_officer_status(
        &self,
        id: &OfficerId,
        status: OfficerStatus,
    ) -> Result<OfficerRecord> {
        let officer = self.directory.update_status(id, status)?;
        info!(officer_id = %id, %status, "officer status updated");
        let _ = self
            .router
            .broadcast_to_dispatch(&RelayEvent::status_update(officer.clone()));
        Ok(officer)
    }

    /// Record a dispatch message and push it to the officer's device.
    pub fn send_message_to_officer(
        &self,
        officer_id: &OfficerId,
        content: String,
    ) -> Result<MessageRecord> {
        if !self.directory.contains(officer_id) {
            return Err(RelayError::OfficerNotFound(officer_id.clone()));
        }
        let message = MessageRecord::from_dispatch(officer_id.clone(), content);
        self.messages.append(message.clone());
        info!(message_id = %message.id, %officer_id, "dispatch message recorded");
        let _ = self
            .router
            .send_to_officer(officer_id, &RelayEvent::message_received(message.clone()));
        Ok(message)
    }

    /// Record an officer's reply to `message_id`, mark the original read and
    /// push the reply to every dispatch console.
    pub fn officer_respond(&self, message_id: &MessageId, content: String) -> Result<MessageRecord> {
        let original = self
            .messages
            .get(message_id)
            .ok_or_else(|| RelayError::MessageNotFound(message_id.clone()))?;
        let officer = self.get_officer(&original.officer_id)?;

        let response = MessageRecord::response_to(&original, content);
        self.messages.append(response.clone());
        self.messages.mark_read(message_id)?;
        info!(
            response_id = %response.id,
            %message_id,
            officer_id = %officer.id,
            "officer response recorded"
        );
        let _ = self
            .router
            .broadcast_to_dispatch(&RelayEvent::officer_response(response.clone(), officer));
        Ok(response)
    }

    /// Conversation with one officer, oldest first.
    pub fn officer_messages(&self, officer_id: &OfficerId) -> Result<Vec<MessageRecord>> {
        if !self.directory.contains(officer_id) {
            return Err(RelayError::OfficerNotFound(officer_id.clone()));
        }
        Ok(self.messages.list_by_officer(officer_id))
    }

    /// Every message, newest first.
    pub fn dispatch_feed(&self) -> Vec<MessageRecord> {
        self.messages.list_all()
    }
}
