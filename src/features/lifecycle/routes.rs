use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::lifecycle::handlers;
use crate::features::lifecycle::services::LifecycleScheduler;

/// Create routes for the lifecycle feature
pub fn routes(scheduler: Arc<LifecycleScheduler>) -> Router {
    Router::new()
        .route("/api/lifecycle/status", get(handlers::lifecycle_status))
        .with_state(scheduler)
}
