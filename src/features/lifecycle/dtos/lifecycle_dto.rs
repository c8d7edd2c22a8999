use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::features::lifecycle::services::SweepRun;
use crate::shared::types::LoadState;

/// Expiry sweep status
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LifecycleStatusDto {
    /// `{"state": "pending"}`, `{"state": "success", "value": SweepRun}` or
    /// `{"state": "failure", "value": "<message>"}`
    #[schema(value_type = Object)]
    pub last_run: LoadState<SweepRun>,
    /// Last successful sweep, absent if none has run yet
    pub last_sweep_at: Option<DateTime<Utc>>,
    pub sweep_interval_hours: u64,
}
