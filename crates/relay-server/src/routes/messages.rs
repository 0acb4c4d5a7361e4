//! `/api/messages` handlers.

use axum::Json;
use axum::extract::{Path, State};
use relay_core::{MessageId, MessageRecord, OfficerId};
use serde::{Deserialize, Serialize};

use crate::errors::ApiError;
use crate::server::AppState;

/// `POST /api/messages/send` body.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    /// Recipient officer.
    pub officer_id: OfficerId,
    /// Message text.
    pub content: String,
}

/// `POST /api/messages/respond` body.
#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    /// The dispatch message being answered.
    pub message_id: MessageId,
    /// Reply text.
    pub content: String,
}

/// Acknowledgement for a recorded dispatch message.
#[derive(Debug, Serialize, Deserialize)]
pub struct SendAck {
    /// Id of the new message.
    pub message_id: MessageId,
    /// Always `"sent"`.
    pub status: String,
}

/// Acknowledgement for a recorded officer response.
#[derive(Debug, Serialize, Deserialize)]
pub struct RespondAck {
    /// Id of the new response.
    pub response_id: MessageId,
    /// Always `"sent"`.
    pub status: String,
}

/// A message listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageList {
    /// Messages, in the endpoint's order.
    pub messages: Vec<MessageRecord>,
}

/// POST /api/messages/send
pub async fn send_message(
    State(state): State<AppState>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<SendAck>, ApiError> {
    let message = state
        .service
        .send_message_to_officer(&req.officer_id, req.content)?;
    Ok(Json(SendAck {
        message_id: message.id,
        status: "sent".into(),
    }))
}

/// POST /api/messages/respond
pub async fn respond(
    State(state): State<AppState>,
    Json(req): Json<RespondRequest>,
) -> Result<Json<RespondAck>, ApiError> {
    let response = state.service.officer_respond(&req.message_id, req.content)?;
    Ok(Json(RespondAck {
        response_id: response.id,
        status: "sent".into(),
    }))
}

/// GET /api/messages/officer/{officer_id}
pub async fn officer_messages(
    State(state): State<AppState>,
    Path(officer_id): Path<OfficerId>,
) -> Result<Json<MessageList>, ApiError> {
    Ok(Json(MessageList {
        messages: state.service.officer_messages(&officer_id)?,
    }))
}

/// GET /api/messages/dispatch
pub async fn dispatch_feed(State(state): State<AppState>) -> Json<MessageList> {
    Json(MessageList {
        messages: state.service.dispatch_feed(),
    })
}
