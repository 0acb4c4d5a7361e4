//! `/api/officers` handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use relay_core::{NewOfficer, OfficerId, OfficerRecord, OfficerStatus};
use serde::{Deserialize, Serialize};

use crate::errors::ApiError;
use crate::server::AppState;

/// `GET /api/officers` body.
#[derive(Debug, Serialize, Deserialize)]
pub struct OfficerList {
    /// Every officer, by name.
    pub officers: Vec<OfficerRecord>,
}

/// Query string for `PUT /api/officers/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    /// One of `normal`, `elevated_vitals`, `emergency`.
    pub status: String,
}

/// GET /api/officers
pub async fn list_officers(State(state): State<AppState>) -> Json<OfficerList> {
    Json(OfficerList {
        officers: state.service.list_officers(),
    })
}

/// GET /api/officers/{officer_id}
pub async fn get_officer(
    State(state): State<AppState>,
    Path(officer_id): Path<OfficerId>,
) -> Result<Json<OfficerRecord>, ApiError> {
    Ok(Json(state.service.get_officer(&officer_id)?))
}

/// POST /api/officers
pub async fn create_officer(
    State(state): State<AppState>,
    Json(officer): Json<NewOfficer>,
) -> Json<OfficerRecord> {
    Json(state.service.create_officer(officer))
}

/// PUT /api/officers/{officer_id}/status?status=...
pub async fn update_status(
    State(state): State<AppState>,
    Path(officer_id): Path<OfficerId>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<OfficerRecord>, ApiError> {
    let status: OfficerStatus = query.status.parse().map_err(ApiError::BadRequest)?;
    Ok(Json(state.service.update_officer_status(&officer_id, status)?))
}
