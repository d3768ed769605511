//! API route configuration.

use crate::api::handlers::{
    create_file_handler, create_zone_handler, delete_file_handler, delete_zone_handler,
    file_handler, file_list_handler, image_config_handler, image_handler, optim_image_handler,
    update_file_handler, update_zone_handler, zone_handler, zone_list_handler,
};
use crate::api::middleware::rate_limit;
use crate::state::AppState;
use axum::{Router, routing::get};

/// Zone and file management routes.
///
/// # Endpoints
///
/// - `GET    /zones`          - List zones
/// - `POST   /zones`          - Create a zone
/// - `GET    /zones/{id}`     - Get a zone
/// - `PATCH  /zones/{id}`     - Update a zone
/// - `DELETE /zones/{id}`     - Delete an empty zone
/// - `GET    /files`          - List files (paginated, projected)
/// - `POST   /files`          - Upload a file
/// - `GET    /files/{id}`     - Get a file (projected)
/// - `PATCH  /files/{id}`     - Update file metadata
/// - `DELETE /files/{id}`     - Delete a file
pub fn management_routes() -> Router<AppState> {
    Router::new()
        .route("/zones", get(zone_list_handler).post(create_zone_handler))
        .route(
            "/zones/{id}",
            get(zone_handler)
                .patch(update_zone_handler)
                .delete(delete_zone_handler),
        )
        .route("/files", get(file_list_handler).post(create_file_handler))
        .route(
            "/files/{id}",
            get(file_handler)
                .patch(update_file_handler)
                .delete(delete_file_handler),
        )
}

/// Image delivery routes, rate limited per client IP.
///
/// # Endpoints
///
/// - `GET /images/v1/config`       - URL template for clients
/// - `GET /images/v1/optim/{spec}` - Optimized variant as JSON
/// - `GET /images/v1/{spec}`       - Optimized variant as bytes
pub fn image_routes() -> Router<AppState> {
    Router::new()
        .route("/images/v1/config", get(image_config_handler))
        .route("/images/v1/optim/{spec}", get(optim_image_handler))
        .route("/images/v1/{spec}", get(image_handler))
        .layer(rate_limit::image_layer())
}
