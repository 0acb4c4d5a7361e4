//! `/healthz` endpoint.

use std::time::Instant;

use serde::Serialize;

use crate::websocket::identity::ClientRole;
use crate::websocket::registry::ConnectionRegistry;

/// Health check response body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the server is running.
    pub status: String,
    /// Seconds since the server started.
    pub uptime_secs: u64,
    /// Registered WebSocket connections.
    pub connections: usize,
    /// Officers with a live device connection.
    pub officers_online: usize,
    /// Connected dispatch consoles.
    pub dispatch_consoles: usize,
}

/// Build a health response from the live registry.
pub fn health_check(start_time: Instant, registry: &ConnectionRegistry) -> HealthResponse {
    HealthResponse {
        status: "ok".into(),
        uptime_secs: start_time.elapsed().as_secs(),
        connections: registry.len(),
        officers_online: registry.count_role(ClientRole::Officer),
        dispatch_consoles: registry.count_role(ClientRole::Dispatch),
    }
}
