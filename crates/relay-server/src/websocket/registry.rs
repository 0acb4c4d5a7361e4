//! Connection registry: identity → live connection.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::connection::ClientConnection;
use super::identity::{ClientIdentity, ClientRole};

/// Tracks which clients are reachable. At most one entry per identity;
/// registering again replaces the previous entry (the old connection is
/// abandoned, not closed).
#[derive(Default)]
pub struct ConnectionRegistry {
    entries: RwLock<HashMap<ClientIdentity, Arc<ClientConnection>>>,
}

impl ConnectionRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `connection` under its identity. Returns the entry it replaced.
    pub fn register(&self, connection: Arc<ClientConnection>) -> Option<Arc<ClientConnection>> {
        let identity = connection.identity.clone();
        let replaced = self.entries.write().insert(identity.clone(), connection);
        if let Some(ref old) = replaced {
            debug!(client = %identity, replaced_conn = %old.id, "connection replaced");
        }
        replaced
    }

    /// Remove the entry for `identity`, if any.
    pub fn deregister(&self, identity: &ClientIdentity) -> Option<Arc<ClientConnection>> {
        self.entries.write().remove(identity)
    }

    /// Remove the entry for `identity` only if it is still `connection_id`.
    ///
    /// Returns `true` when an entry was removed. A session that closes after
    /// its client already reconnected leaves the newer entry in place.
    pub fn release(&self, identity: &ClientIdentity, connection_id: &str) -> bool {
        let mut entries = self.entries.write();
        match entries.get(identity) {
            Some(current) if current.id == connection_id => {
                let _ = entries.remove(identity);
                true
            }
            _ => false,
        }
    }

    /// The live connection for `identity`.
    pub fn lookup(&self, identity: &ClientIdentity) -> Option<Arc<ClientConnection>> {
        self.entries.read().get(identity).cloned()
    }

    /// Every dispatch console, in no particular order.
    pub fn dispatch_connections(&self) -> Vec<Arc<ClientConnection>> {
        self.entries
            .read()
            .values()
            .filter(|c| c.identity.is_dispatch())
            .cloned()
            .collect()
    }

    /// Total registered connections.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Registered connections with the given role.
    pub fn count_role(&self, role: ClientRole) -> usize {
        self.entries
            .read()
            .keys()
            .filter(|identity| identity.role() == role)
            .count()
    }
}
