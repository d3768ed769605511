//! Handlers for file endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::{Map, Value};
use validator::Validate;

use crate::api::dto::file::{
    CreateFileRequest, FileFieldsParams, FileListParams, UpdateFileRequest,
};
use crate::application::services::FileList;
use crate::error::AppError;
use crate::state::AppState;

/// Lists files page by page.
///
/// # Endpoint
///
/// `GET /files?zone=1&offset=0&limit=10&sort=-updatedAt&fields=name,size`
///
/// # Query Parameters
///
/// - `zone` - only files of this zone
/// - `offset` (default 0), `limit` (1-100, default 10)
/// - `sort` - comma-separated fields, `-` prefix for descending
///   (default `-updatedAt`)
/// - `fields` - comma-separated fields, `*` for all (default all)
///
/// # Response
///
/// ```json
/// { "files": [{ "id": 1, "name": "logo" }], "count": 1 }
/// ```
///
/// `count` is only computed for the first page and is `-1` otherwise.
pub async fn file_list_handler(
    State(state): State<AppState>,
    Query(params): Query<FileListParams>,
) -> Result<Json<FileList>, AppError> {
    let page = state.file_service.list(params.into()).await?;
    Ok(Json(page))
}

/// Uploads an image.
///
/// # Endpoint
///
/// `POST /files`
///
/// # Request Body
///
/// ```json
/// { "name": "logo", "zone": 1, "maxAge": "1h", "creator": "tree", "data": "<base64>" }
/// ```
///
/// # Errors
///
/// Returns 400 for invalid fields, data that is not a png, jpeg or webp
/// image, or an unknown zone. Returns 409 if the name is taken.
pub async fn create_file_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateFileRequest>,
) -> Result<(StatusCode, Json<Map<String, Value>>), AppError> {
    payload.validate()?;

    let file = state.file_service.create(payload.into_input()?).await?;
    Ok((StatusCode::CREATED, Json(file)))
}

/// `GET /files/{id}?fields=name,data`
pub async fn file_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Query(params): Query<FileFieldsParams>,
) -> Result<Json<Map<String, Value>>, AppError> {
    let fields = params.fields.unwrap_or_default();
    Ok(Json(state.file_service.get(id, &fields).await?))
}

/// Updates description, max age or zone of a file.
///
/// # Endpoint
///
/// `PATCH /files/{id}`
pub async fn update_file_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateFileRequest>,
) -> Result<Json<Map<String, Value>>, AppError> {
    payload.validate()?;

    let file = state.file_service.update(id, payload.into()).await?;
    Ok(Json(file))
}

/// `DELETE /files/{id}`
pub async fn delete_file_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.file_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
