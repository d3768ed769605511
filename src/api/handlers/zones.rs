//! Handlers for zone management endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::zone::{CreateZoneRequest, UpdateZoneRequest, ZoneListResponse};
use crate::domain::entities::Zone;
use crate::error::AppError;
use crate::state::AppState;

/// Lists all zones.
///
/// # Endpoint
///
/// `GET /zones`
pub async fn zone_list_handler(
    State(state): State<AppState>,
) -> Result<Json<ZoneListResponse>, AppError> {
    let zones = state.zone_service.list().await?;
    Ok(Json(ZoneListResponse { zones }))
}

/// Creates a zone.
///
/// # Endpoint
///
/// `POST /zones`
///
/// # Errors
///
/// Returns 400 if name or owner is invalid.
/// Returns 409 if the name is taken.
pub async fn create_zone_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateZoneRequest>,
) -> Result<(StatusCode, Json<Zone>), AppError> {
    payload.validate()?;

    let zone = state
        .zone_service
        .create(payload.name, payload.owner, payload.description)
        .await?;

    Ok((StatusCode::CREATED, Json(zone)))
}

/// `GET /zones/{id}`
pub async fn zone_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<Zone>, AppError> {
    Ok(Json(state.zone_service.get(id).await?))
}

/// Partially updates a zone.
///
/// # Endpoint
///
/// `PATCH /zones/{id}`
///
/// # Errors
///
/// Returns 400 for an empty or invalid update, 404 if the zone does not
/// exist and 409 if the new name is taken.
pub async fn update_zone_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateZoneRequest>,
) -> Result<Json<Zone>, AppError> {
    payload.validate()?;

    let zone = state.zone_service.update(id, payload.into()).await?;
    Ok(Json(zone))
}

/// Deletes an empty zone.
///
/// # Endpoint
///
/// `DELETE /zones/{id}`
///
/// # Errors
///
/// Returns 404 if the zone does not exist.
/// Returns 409 while the zone still has files.
pub async fn delete_zone_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.zone_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
