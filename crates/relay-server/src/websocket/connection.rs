//! Live connection handle.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::identity::ClientIdentity;

/// Why a frame could not be queued for a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The client's outbound queue is full.
    #[error("outbound queue full")]
    QueueFull,
    /// The client's writer has gone away.
    #[error("connection closed")]
    Closed,
}

/// One connected client. The registry holds these by identity; the
/// session's writer task drains the other end of `tx` into the socket.
pub struct ClientConnection {
    /// Unique per accepted socket, so a reconnect under the same identity
    /// is distinguishable from the connection it replaced.
    pub id: String,
    /// Who the client is.
    pub identity: ClientIdentity,
    tx: mpsc::Sender<Arc<String>>,
    /// When this connection was established.
    pub connected_at: Instant,
    dropped_messages: AtomicU64,
}

impl ClientConnection {
    /// Create a connection around an outbound queue sender.
    pub fn new(identity: ClientIdentity, tx: mpsc::Sender<Arc<String>>) -> Self {
        Self {
            id: format!("conn_{}", Uuid::now_v7()),
            identity,
            tx,
            connected_at: Instant::now(),
            dropped_messages: AtomicU64::new(0),
        }
    }

    /// Queue a serialized frame without waiting.
    ///
    /// A full or closed queue is reported and counted; nothing is retried.
    pub fn send(&self, frame: Arc<String>) -> Result<(), DeliveryError> {
        self.tx.try_send(frame).map_err(|e| {
            let _ = self.dropped_messages.fetch_add(1, Ordering::Relaxed);
            match e {
                mpsc::error::TrySendError::Full(_) => DeliveryError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => DeliveryError::Closed,
            }
        })
    }

    /// Frames that could not be queued.
    pub fn drop_count(&self) -> u64 {
        self.dropped_messages.load(Ordering::Relaxed)
    }

    /// Connection age.
    pub fn age(&self) -> Duration {
        self.connected_at.elapsed()
    }
}
