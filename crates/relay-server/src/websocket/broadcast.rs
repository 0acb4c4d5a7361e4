//! Event routing to live connections.
//!
//! Delivery is best-effort and at-most-once: the directory and message log
//! already hold the canonical record, so a failed write is logged and
//! counted, never returned to the operation that triggered it. Offline
//! officers simply miss the push and reconcile through the REST listings.

use std::sync::Arc;

use metrics::counter;
use relay_core::{OfficerId, RelayEvent};
use tracing::{debug, warn};

use super::connection::ClientConnection;
use super::identity::ClientIdentity;
use super::registry::ConnectionRegistry;
use crate::metrics::{DELIVERY_FAILURES_TOTAL, EVENTS_DELIVERED_TOTAL};

/// Outcome of one routing call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Recipients a write was attempted on.
    pub attempted: usize,
    /// Recipients whose queue accepted the frame.
    pub delivered: usize,
}

impl DeliveryReport {
    /// Recipients that were attempted but not reached.
    pub fn failed(&self) -> usize {
        self.attempted - self.delivered
    }
}

/// Routes events to one officer or to every dispatch console.
pub struct BroadcastRouter {
    registry: Arc<ConnectionRegistry>,
}

impl BroadcastRouter {
    /// Router over `registry`.
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// The registry this router reads.
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Push `event` to the officer's device, if it is connected.
    pub fn send_to_officer(&self, officer_id: &OfficerId, event: &RelayEvent) -> DeliveryReport {
        let identity = ClientIdentity::officer(officer_id);
        let Some(conn) = self.registry.lookup(&identity) else {
            debug!(
                event_type = event.event_type(),
                %officer_id,
                "officer offline, event dropped"
            );
            return DeliveryReport::default();
        };
        let Some(frame) = encode(event) else {
            return DeliveryReport::default();
        };
        let delivered = usize::from(deliver(&conn, event, &frame));
        DeliveryReport {
            attempted: 1,
            delivered,
        }
    }

    /// Push `event` to every dispatch console. Each recipient is written
    /// independently; a failed recipient does not stop the others.
    pub fn broadcast_to_dispatch(&self, event: &RelayEvent) -> DeliveryReport {
        let recipients = self.registry.dispatch_connections();
        if recipients.is_empty() {
            debug!(event_type = event.event_type(), "no dispatch consoles connected");
            return DeliveryReport::default();
        }
        let Some(frame) = encode(event) else {
            return DeliveryReport::default();
        };

        let delivered = recipients
            .iter()
            .filter(|conn| deliver(conn, event, &frame))
            .count();
        let report = DeliveryReport {
            attempted: recipients.len(),
            delivered,
        };
        debug!(
            event_type = event.event_type(),
            recipients = report.attempted,
            delivered = report.delivered,
            failed = report.failed(),
            "broadcast to dispatch"
        );
        report
    }

    /// Reply directly on one connection (used for `pong`).
    pub fn reply(&self, conn: &ClientConnection, event: &RelayEvent) -> bool {
        encode(event).is_some_and(|frame| deliver(conn, event, &frame))
    }
}

fn encode(event: &RelayEvent) -> Option<Arc<String>> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Arc::new(json)),
        Err(e) => {
            warn!(event_type = event.event_type(), error = %e, "failed to serialize event");
            None
        }
    }
}

fn deliver(conn: &ClientConnection, event: &RelayEvent, frame: &Arc<String>) -> bool {
    match conn.send(Arc::clone(frame)) {
        Ok(()) => {
            counter!(EVENTS_DELIVERED_TOTAL, "event" => event.event_type()).increment(1);
            true
        }
        Err(e) => {
            counter!(DELIVERY_FAILURES_TOTAL, "event" => event.event_type()).increment(1);
            warn!(
                client = %conn.identity,
                conn_id = %conn.id,
                event_type = event.event_type(),
                error = %e,
                "failed to deliver event"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use relay_core::{MessageRecord, OfficerRecord, OfficerStatus};
    use tokio::sync::mpsc;

    fn connect(
        registry: &ConnectionRegistry,
        identity: ClientIdentity,
    ) -> mpsc::Receiver<Arc<String>> {
        let (tx, rx) = mpsc::channel(8);
        let _ = registry.register(Arc::new(ClientConnection::new(identity, tx)));
        rx
    }

    fn status_event() -> RelayEvent {
        RelayEvent::status_update(OfficerRecord {
            id: OfficerId::from("officer_001"),
            name: "Daniel Bernardo".into(),
            status: OfficerStatus::Emergency,
            last_seen: Utc::now(),
        })
    }

    fn parse(frame: &str) -> serde_json::Value {
        serde_json::from_str(frame).unwrap()
    }

    #[test]
    fn send_to_connected_officer() {
        let registry = Arc::new(ConnectionRegistry::new());
        let mut rx = connect(&registry, ClientIdentity::officer(&OfficerId::from("o1")));
        let router = BroadcastRouter::new(registry);

        let msg = MessageRecord::from_dispatch(OfficerId::from("o1"), "report in".into());
        let report = router.send_to_officer(
            &OfficerId::from("o1"),
            &RelayEvent::message_received(msg),
        );
        assert_eq!(report, DeliveryReport { attempted: 1, delivered: 1 });

        let frame = parse(&rx.try_recv().unwrap());
        assert_eq!(frame["type"], "message_received");
        assert_eq!(frame["data"]["content"], "report in");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn send_to_offline_officer_is_dropped() {
        let router = BroadcastRouter::new(Arc::new(ConnectionRegistry::new()));
        let report = router.send_to_officer(&OfficerId::from("ghost"), &RelayEvent::pong());
        assert_eq!(report, DeliveryReport::default());
    }

    #[test]
    fn send_to_officer_ignores_dispatch_with_same_id() {
        let registry = Arc::new(ConnectionRegistry::new());
        let mut dispatch_rx = connect(&registry, ClientIdentity::dispatch("o1"));
        let router = BroadcastRouter::new(registry);

        let report = router.send_to_officer(&OfficerId::from("o1"), &RelayEvent::pong());
        assert_eq!(report.attempted, 0);
        assert!(dispatch_rx.try_recv().is_err());
    }

    #[test]
    fn send_to_closed_officer_is_swallowed() {
        let registry = Arc::new(ConnectionRegistry::new());
        drop(connect(&registry, ClientIdentity::officer(&OfficerId::from("o1"))));
        let router = BroadcastRouter::new(registry);

        let report = router.send_to_officer(&OfficerId::from("o1"), &status_event());
        assert_eq!(report, DeliveryReport { attempted: 1, delivered: 0 });
        assert_eq!(report.failed(), 1);
    }

    #[test]
    fn broadcast_reaches_every_dispatch_console() {
        let registry = Arc::new(ConnectionRegistry::new());
        let mut consoles: Vec<_> = (0..3)
            .map(|i| connect(&registry, ClientIdentity::dispatch(format!("desk{i}"))))
            .collect();
        let mut officer_rx = connect(&registry, ClientIdentity::officer(&OfficerId::from("o1")));
        let router = BroadcastRouter::new(registry);

        let report = router.broadcast_to_dispatch(&status_event());
        assert_eq!(report, DeliveryReport { attempted: 3, delivered: 3 });

        for rx in &mut consoles {
            let frame = parse(&rx.try_recv().unwrap());
            assert_eq!(frame["type"], "status_update");
            assert_eq!(frame["status"], "emergency");
            assert!(rx.try_recv().is_err());
        }
        assert!(officer_rx.try_recv().is_err());
    }

    #[test]
    fn duplicate_dispatch_id_reaches_latest_console_only() {
        let registry = Arc::new(ConnectionRegistry::new());
        let mut first = connect(&registry, ClientIdentity::dispatch("desk"));
        let mut second = connect(&registry, ClientIdentity::dispatch("desk"));
        let router = BroadcastRouter::new(registry);

        let report = router.broadcast_to_dispatch(&RelayEvent::pong());
        assert_eq!(report, DeliveryReport { attempted: 1, delivered: 1 });
        assert_eq!(parse(&second.try_recv().unwrap())["type"], "pong");
        assert!(first.try_recv().is_err());
    }

    #[test]
    fn broadcast_survives_failed_recipients() {
        let registry = Arc::new(ConnectionRegistry::new());
        for i in 0..4 {
            drop(connect(&registry, ClientIdentity::dispatch(format!("dead{i}"))));
        }
        let mut live = connect(&registry, ClientIdentity::dispatch("alive"));
        let router = BroadcastRouter::new(registry);

        let report = router.broadcast_to_dispatch(&status_event());
        assert_eq!(report.attempted, 5);
        assert_eq!(report.delivered, 1);
        assert_eq!(report.failed(), 4);
        assert_eq!(parse(&live.try_recv().unwrap())["officer_id"], "officer_001");
    }

    #[test]
    fn broadcast_with_full_queue_still_reaches_others() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (tx, _stalled_rx) = mpsc::channel(1);
        let stalled = Arc::new(ClientConnection::new(ClientIdentity::dispatch("slow"), tx));
        stalled.send(Arc::new("backlog".into())).unwrap();
        let _ = registry.register(stalled.clone());
        let mut live = connect(&registry, ClientIdentity::dispatch("fast"));
        let router = BroadcastRouter::new(registry);

        let report = router.broadcast_to_dispatch(&status_event());
        assert_eq!(report.delivered, 1);
        assert!(live.try_recv().is_ok());
        assert_eq!(stalled.drop_count(), 1);
    }

    #[test]
    fn broadcast_with_no_consoles() {
        let router = BroadcastRouter::new(Arc::new(ConnectionRegistry::new()));
        assert_eq!(router.broadcast_to_dispatch(&status_event()), DeliveryReport::default());
    }

    #[test]
    fn reply_writes_pong() {
        let (tx, mut rx) = mpsc::channel(8);
        let conn = ClientConnection::new(ClientIdentity::dispatch("d"), tx);
        let router = BroadcastRouter::new(Arc::new(ConnectionRegistry::new()));
        assert!(router.reply(&conn, &RelayEvent::pong()));
        assert_eq!(*rx.try_recv().unwrap(), r#"{"type":"pong"}"#);
    }
}
