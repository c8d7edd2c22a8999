use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::preferences::handlers;
use crate::features::preferences::services::PreferenceService;

/// Create routes for the preferences feature
pub fn routes(preference_service: Arc<PreferenceService>) -> Router {
    Router::new()
        .route(
            "/api/preferences/dark-mode",
            get(handlers::get_dark_mode).put(handlers::set_dark_mode),
        )
        .with_state(preference_service)
}
