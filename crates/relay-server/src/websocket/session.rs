//! WebSocket session lifecycle: one connected client from upgrade through
//! disconnect.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use metrics::{counter, gauge};
use relay_core::RelayEvent;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use super::connection::ClientConnection;
use super::identity::ClientIdentity;
use super::protocol::{ControlMessage, decode_frame};
use super::registry::ConnectionRegistry;
use crate::metrics::{
    FRAMES_IGNORED_TOTAL, WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_DISCONNECTIONS_TOTAL,
};
use crate::service::RelayService;

/// Where a session is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Accepted but not yet registered.
    Connecting,
    /// Registered and reading frames.
    Open,
    /// Released from the registry. Terminal.
    Closed,
}

/// What handling one inbound frame did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A `pong` was queued back to the client.
    Ponged,
    /// The officer's status was changed and broadcast.
    StatusUpdated,
    /// The frame had no effect.
    Ignored,
}

/// Registry membership and frame handling for one connection.
///
/// Closing is idempotent and also happens on drop, so the identity is
/// released exactly once however the session ends.
pub struct Session {
    connection: Arc<ClientConnection>,
    registry: Arc<ConnectionRegistry>,
    state: SessionState,
}

impl Session {
    /// Register a new connection for `identity` and open the session.
    pub fn accept(
        identity: ClientIdentity,
        tx: mpsc::Sender<Arc<String>>,
        registry: Arc<ConnectionRegistry>,
    ) -> Self {
        let mut session = Self {
            connection: Arc::new(ClientConnection::new(identity, tx)),
            registry,
            state: SessionState::Connecting,
        };
        if let Some(previous) = session.registry.register(session.connection.clone()) {
            info!(
                client = %session.connection.identity,
                previous_conn = %previous.id,
                "client reconnected, previous connection abandoned"
            );
        }
        session.state = SessionState::Open;
        session
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The registered connection.
    pub fn connection(&self) -> &Arc<ClientConnection> {
        &self.connection
    }

    /// Who the client is.
    pub fn identity(&self) -> &ClientIdentity {
        &self.connection.identity
    }

    /// Decode and act on one inbound text frame.
    pub fn handle_frame(&self, text: &str, service: &RelayService) -> FrameOutcome {
        if self.state != SessionState::Open {
            return ignored("closed");
        }
        let message = match decode_frame(text) {
            Ok(Some(message)) => message,
            Ok(None) => {
                debug!(client = %self.identity(), "unhandled frame type");
                return ignored("unknown_type");
            }
            Err(e) => {
                debug!(client = %self.identity(), error = %e, "undecodable frame");
                return ignored("malformed");
            }
        };

        match message {
            ControlMessage::Ping => {
                let _ = service.router().reply(&self.connection, &RelayEvent::pong());
                FrameOutcome::Ponged
            }
            ControlMessage::StatusUpdate { status } => {
                let Some(officer_id) = self.identity().officer_id() else {
                    debug!(client = %self.identity(), "status_update from non-officer");
                    return ignored("wrong_role");
                };
                match service.update_officer_status(&officer_id, status) {
                    Ok(_) => FrameOutcome::StatusUpdated,
                    Err(e) => {
                        warn!(%officer_id, error = %e, "status_update for unknown officer");
                        ignored("unknown_officer")
                    }
                }
            }
        }
    }

    /// Release the identity from the registry. Returns `false` if the
    /// session was already closed.
    pub fn close(&mut self) -> bool {
        if self.state == SessionState::Closed {
            return false;
        }
        self.state = SessionState::Closed;
        let released = self
            .registry
            .release(&self.connection.identity, &self.connection.id);
        if !released {
            debug!(
                client = %self.connection.identity,
                conn_id = %self.connection.id,
                "entry already replaced, nothing to release"
            );
        }
        true
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

fn ignored(reason: &'static str) -> FrameOutcome {
    counter!(FRAMES_IGNORED_TOTAL, "reason" => reason).increment(1);
    FrameOutcome::Ignored
}

/// Run a WebSocket session for a connected client.
///
/// 1. Registers the client under its identity
/// 2. Forwards queued events to the socket from a writer task
/// 3. Handles inbound text (and UTF-8 binary) frames
/// 4. Releases the identity on disconnect
#[instrument(skip_all, fields(client = %identity))]
pub async fn run_session(
    ws: WebSocket,
    identity: ClientIdentity,
    service: Arc<RelayService>,
    queue_capacity: usize,
) {
    let (mut ws_tx, mut ws_rx) = ws.split();
    let (send_tx, mut send_rx) = mpsc::channel::<Arc<String>>(queue_capacity);
    let role = identity.role().as_str();

    let mut session = Session::accept(identity, send_tx, service.registry().clone());
    info!(conn_id = %session.connection().id, "client connected");
    counter!(WS_CONNECTIONS_TOTAL, "role" => role).increment(1);
    gauge!(WS_CONNECTIONS_ACTIVE, "role" => role).increment(1.0);

    let outbound = tokio::spawn(async move {
        while let Some(frame) = send_rx.recv().await {
            if ws_tx.send(Message::Text(frame.as_str().into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(msg) = ws_rx.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                debug!(error = %e, "socket read failed");
                break;
            }
        };
        let text = match msg {
            Message::Text(ref t) => t.as_str().to_owned(),
            Message::Binary(ref data) => match std::str::from_utf8(data) {
                Ok(s) => s.to_owned(),
                Err(_) => {
                    debug!(len = data.len(), "non-UTF-8 binary frame");
                    let _ = ignored("malformed");
                    continue;
                }
            },
            Message::Close(_) => {
                info!("client sent close frame");
                break;
            }
            Message::Ping(_) | Message::Pong(_) => continue,
        };
        let _ = session.handle_frame(&text, &service);
    }

    let _ = session.close();
    outbound.abort();
    info!(
        conn_id = %session.connection().id,
        connected_secs = session.connection().age().as_secs(),
        dropped = session.connection().drop_count(),
        "client disconnected"
    );
    counter!(WS_DISCONNECTIONS_TOTAL, "role" => role).increment(1);
    gauge!(WS_CONNECTIONS_ACTIVE, "role" => role).decrement(1.0);
}
