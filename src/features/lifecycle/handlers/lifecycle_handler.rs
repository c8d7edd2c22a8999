use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::features::lifecycle::dtos::LifecycleStatusDto;
use crate::features::lifecycle::services::LifecycleScheduler;
use crate::shared::types::ApiResponse;

/// Most recent expiry sweep check and the last successful sweep time
#[utoipa::path(
    get,
    path = "/api/lifecycle/status",
    responses(
        (status = 200, description = "Sweep status", body = ApiResponse<LifecycleStatusDto>),
        (status = 503, description = "Preference store unavailable")
    ),
    tag = "lifecycle"
)]
pub async fn lifecycle_status(
    State(scheduler): State<Arc<LifecycleScheduler>>,
) -> Result<Json<ApiResponse<LifecycleStatusDto>>> {
    let status = LifecycleStatusDto {
        last_run: scheduler.last_run().await,
        last_sweep_at: scheduler.last_sweep_at().await?,
        sweep_interval_hours: scheduler.sweep_interval().as_secs() / 3600,
    };

    Ok(Json(ApiResponse::success(Some(status), None, None)))
}
