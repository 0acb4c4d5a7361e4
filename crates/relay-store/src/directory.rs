//! Officer directory.

use std::collections::HashMap;

use chrono::Utc;
use parking_lot::RwLock;
use relay_core::{NewOfficer, OfficerId, OfficerRecord, OfficerStatus, RelayError, Result};
use tracing::debug;

/// Officer identity and status records.
pub trait Directory: Send + Sync {
    /// Look up one officer.
    fn get(&self, id: &OfficerId) -> Option<OfficerRecord>;

    /// All officers, ordered by name then id.
    fn list(&self) -> Vec<OfficerRecord>;

    /// Create an officer with a server-assigned id.
    fn create(&self, officer: NewOfficer) -> OfficerRecord;

    /// Insert or replace a record under its own id.
    fn upsert(&self, officer: OfficerRecord);

    /// Set an officer's status and refresh `last_seen`. Returns the updated
    /// record.
    fn update_status(&self, id: &OfficerId, status: OfficerStatus) -> Result<OfficerRecord>;

    /// Whether an officer exists.
    fn contains(&self, id: &OfficerId) -> bool {
        self.get(id).is_some()
    }
}

/// [`Directory`] backed by a locked `HashMap`.
#[derive(Default)]
pub struct InMemoryDirectory {
    officers: RwLock<HashMap<OfficerId, OfficerRecord>>,
}

impl InMemoryDirectory {
    /// Empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of officers.
    pub fn len(&self) -> usize {
        self.officers.read().len()
    }

    /// Whether the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.officers.read().is_empty()
    }
}

impl Directory for InMemoryDirectory {
    fn get(&self, id: &OfficerId) -> Option<OfficerRecord> {
        self.officers.read().get(id).cloned()
    }

    fn list(&self) -> Vec<OfficerRecord> {
        let mut officers: Vec<OfficerRecord> = self.officers.read().values().cloned().collect();
        officers.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        officers
    }

    fn create(&self, officer: NewOfficer) -> OfficerRecord {
        let record = OfficerRecord {
            id: OfficerId::generate(),
            name: officer.name,
            status: officer.status,
            last_seen: Utc::now(),
        };
        let _ = self
            .officers
            .write()
            .insert(record.id.clone(), record.clone());
        debug!(officer_id = %record.id, status = %record.status, "officer created");
        record
    }

    fn upsert(&self, officer: OfficerRecord) {
        let _ = self.officers.write().insert(officer.id.clone(), officer);
    }

    fn update_status(&self, id: &OfficerId, status: OfficerStatus) -> Result<OfficerRecord> {
        let mut officers = self.officers.write();
        let officer = officers
            .get_mut(id)
            .ok_or_else(|| RelayError::OfficerNotFound(id.clone()))?;
        officer.set_status(status, Utc::now());
        debug!(officer_id = %id, %status, "officer status updated");
        Ok(officer.clone())
    }
}
