//! Events pushed to live clients.
//!
//! `RelayEvent` is the closed set of outbound frames. It serializes with an
//! internal `type` tag, matching what field devices and dispatch consoles
//! already parse:
//!
//! ```text
//! {"type":"status_update","officer_id":..,"status":..,"officer":{..},"timestamp":..}
//! {"type":"message_received","data":{..},"timestamp":..}
//! {"type":"officer_response","data":{..},"officer":{..},"timestamp":..}
//! {"type":"pong"}
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::OfficerId;
use crate::message::MessageRecord;
use crate::officer::{OfficerRecord, OfficerStatus};

/// An outbound event frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayEvent {
    /// An officer's status changed. Fanned out to every dispatch console.
    StatusUpdate {
        /// Officer whose status changed.
        officer_id: OfficerId,
        /// The new status.
        status: OfficerStatus,
        /// Full record after the change.
        officer: OfficerRecord,
        /// When the event was emitted.
        timestamp: DateTime<Utc>,
    },
    /// Dispatch sent a message. Delivered to the addressed officer only.
    MessageReceived {
        /// The stored message.
        #[serde(rename = "data")]
        message: MessageRecord,
        /// Message creation time.
        timestamp: DateTime<Utc>,
    },
    /// An officer answered a message. Fanned out to every dispatch console.
    OfficerResponse {
        /// The stored response.
        #[serde(rename = "data")]
        message: MessageRecord,
        /// Responding officer's current record.
        officer: OfficerRecord,
        /// Response creation time.
        timestamp: DateTime<Utc>,
    },
    /// Reply to a client keep-alive ping.
    Pong,
}

impl RelayEvent {
    /// Status change for `officer`, stamped now.
    #[must_use]
    pub fn status_update(officer: OfficerRecord) -> Self {
        Self::StatusUpdate {
            officer_id: officer.id.clone(),
            status: officer.status,
            officer,
            timestamp: Utc::now(),
        }
    }

    /// New dispatch message, stamped with the message's own timestamp.
    #[must_use]
    pub fn message_received(message: MessageRecord) -> Self {
        let timestamp = message.timestamp;
        Self::MessageReceived { message, timestamp }
    }

    /// Officer response, stamped with the response's timestamp.
    #[must_use]
    pub fn officer_response(message: MessageRecord, officer: OfficerRecord) -> Self {
        let timestamp = message.timestamp;
        Self::OfficerResponse {
            message,
            officer,
            timestamp,
        }
    }

    /// Keep-alive reply.
    #[must_use]
    pub const fn pong() -> Self {
        Self::Pong
    }

    /// Wire name of the event, as written in the `type` field.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::StatusUpdate { .. } => "status_update",
            Self::MessageReceived { .. } => "message_received",
            Self::OfficerResponse { .. } => "officer_response",
            Self::Pong => "pong",
        }
    }
}
