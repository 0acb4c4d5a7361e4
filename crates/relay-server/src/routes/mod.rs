//! REST API routes.

pub mod messages;
pub mod officers;

use axum::Router;
use axum::routing::{get, post, put};

use crate::server::AppState;

/// Routes mounted under `/api`.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route(
            "/officers",
            get(officers::list_officers).post(officers::create_officer),
        )
        .route("/officers/{officer_id}", get(officers::get_officer))
        .route("/officers/{officer_id}/status", put(officers::update_status))
        .route("/messages/send", post(messages::send_message))
        .route("/messages/respond", post(messages::respond))
        .route(
            "/messages/officer/{officer_id}",
            get(messages::officer_messages),
        )
        .route("/messages/dispatch", get(messages::dispatch_feed))
}
