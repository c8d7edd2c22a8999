use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::reports::handlers;
use crate::features::reports::services::ReportService;

/// Create routes for the reports feature
pub fn routes(report_service: Arc<ReportService>) -> Router {
    Router::new()
        .route("/api/reports", get(handlers::list_reports))
        .route("/api/reports/popular", get(handlers::popular_reports))
        .route(
            "/api/users/{user_id}/reports",
            get(handlers::list_user_reports),
        )
        .route("/api/users/{user_id}/stats", get(handlers::user_stats))
        .with_state(report_service)
}
