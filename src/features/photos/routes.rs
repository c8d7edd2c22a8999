use axum::{extract::DefaultBodyLimit, routing::post, Router};
use std::sync::Arc;

use crate::features::photos::handlers::upload_photo;
use crate::features::photos::services::PhotoService;

/// Create routes for the photos feature
pub fn routes(photo_service: Arc<PhotoService>) -> Router {
    // Upload limit plus headroom for multipart framing
    let body_limit = photo_service.max_upload_size() + 1024 * 1024;

    Router::new()
        .route(
            "/api/photos",
            post(upload_photo).layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(photo_service)
}
