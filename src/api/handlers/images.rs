//! Handlers for image delivery.

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::application::services::{ImageConfig, OptimImage};
use crate::domain::entities::ImageType;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::etag::{etag_for, if_none_match_hits};

/// Returns the URL template clients fill with a file spec.
///
/// # Endpoint
///
/// `GET /images/v1/config`
///
/// ```json
/// { "url": "https://img.example.com/images/v1/:file" }
/// ```
pub async fn image_config_handler(State(state): State<AppState>) -> Json<ImageConfig> {
    Json(state.image_service.config())
}

/// Returns an optimized variant as JSON with base64 data.
///
/// # Endpoint
///
/// `GET /images/v1/optim/{spec}`
pub async fn optim_image_handler(
    Path(spec): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<OptimImage>, AppError> {
    Ok(Json(state.image_service.optimize(&spec).await?))
}

/// Serves an optimized variant as raw bytes.
///
/// # Endpoint
///
/// `GET /images/v1/{spec}`, e.g. `/images/v1/logo-80-200-0.webp`
///
/// # Response Headers
///
/// - `Content-Type` - MIME type of the output
/// - `Cache-Control: public, max-age=<seconds>` - from the file's max age
/// - `ETag` - content hash; a matching `If-None-Match` gets `304 Not Modified`
///
/// # Errors
///
/// Returns 400 for a malformed spec, 404 for an unknown file and 503 if the
/// variant needs an optimizer that is not configured.
pub async fn image_handler(
    Path(spec): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let image = state.image_service.optimize(&spec).await?;

    let etag = etag_for(&image.data);
    let cache_control = format!("public, max-age={}", image.max_age_seconds());

    let not_modified = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| if_none_match_hits(v, &etag));

    let mut response = if not_modified {
        StatusCode::NOT_MODIFIED.into_response()
    } else {
        let mime = image
            .image_type
            .parse::<ImageType>()
            .map(|t| t.mime())
            .unwrap_or("application/octet-stream");

        ([(header::CONTENT_TYPE, mime)], image.data).into_response()
    };

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&etag) {
        headers.insert(header::ETAG, value);
    }
    if let Ok(value) = HeaderValue::from_str(&cache_control) {
        headers.insert(header::CACHE_CONTROL, value);
    }

    Ok(response)
}
