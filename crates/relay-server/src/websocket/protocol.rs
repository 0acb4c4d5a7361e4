//! Inbound control frames.

use relay_core::OfficerStatus;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// A frame a client may send.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlMessage {
    /// Keep-alive; answered with `pong`.
    Ping,
    /// Officer-reported status change.
    StatusUpdate {
        /// New status. Omitted means `normal`.
        #[serde(default)]
        status: OfficerStatus,
    },
}

/// Why an inbound frame could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Not JSON at all.
    #[error("malformed JSON: {0}")]
    Malformed(#[source] serde_json::Error),
    /// JSON, but not an object with a string `type`.
    #[error("frame is not an object with a string type")]
    MissingType,
    /// A known `type` with a payload that does not fit it.
    #[error("invalid {kind} payload: {source}")]
    InvalidPayload {
        /// The frame's `type`.
        kind: String,
        /// Underlying decode failure.
        #[source]
        source: serde_json::Error,
    },
}

const KNOWN_TYPES: [&str; 2] = ["ping", "status_update"];

/// Decode one text frame.
///
/// `Ok(None)` means a well-formed frame of a type this server does not
/// handle; callers ignore it.
pub fn decode_frame(text: &str) -> Result<Option<ControlMessage>, DecodeError> {
    let value: Value = serde_json::from_str(text).map_err(DecodeError::Malformed)?;
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(DecodeError::MissingType)?
        .to_owned();
    if !KNOWN_TYPES.contains(&kind.as_str()) {
        return Ok(None);
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(|source| DecodeError::InvalidPayload { kind, source })
}
