use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::reports::aggregation::StatusFilter;
use crate::features::reports::models::{Report, ReportCategory, ReportPriority, ReportStatus};
use crate::features::reports::services::ReportQuery;
use crate::shared::constants::URGENT_SEVERITY;

/// Response DTO for report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportResponseDto {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: ReportCategory,
    /// Indonesian category label, e.g. "Jalan Rusak"
    pub category_label: String,
    pub status: ReportStatus,
    /// Indonesian status label, e.g. "Diproses"
    pub status_label: String,
    pub priority: ReportPriority,
    pub severity: u8,
    pub latitude: f64,
    pub longitude: f64,
    pub location_name: String,
    pub address: String,
    pub photo_id: Option<String>,
    pub completion_photo_id: Option<String>,
    pub votes: u32,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Report> for ReportResponseDto {
    fn from(r: Report) -> Self {
        Self {
            id: r.id,
            title: r.title,
            description: r.description,
            category_label: r.category.label_id().to_string(),
            category: r.category,
            status_label: r.status.label_id().to_string(),
            status: r.status,
            priority: r.priority,
            severity: r.severity,
            latitude: r.latitude,
            longitude: r.longitude,
            location_name: r.location_name,
            address: r.address,
            photo_id: r.photo_id,
            completion_photo_id: r.completion_photo_id,
            votes: r.votes,
            user_id: r.user_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Sort direction on `created_at`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

/// Query params for report listings
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ReportListQuery {
    /// "all" (default), a status key ("in_progress") or label ("Diproses")
    pub status: Option<String>,
    /// Only reports with severity 4 or higher
    #[serde(default)]
    pub urgent: bool,
    /// "newest" (default) or "oldest"
    #[serde(default)]
    pub sort: SortOrder,
}

impl ReportListQuery {
    pub fn to_query(&self) -> Result<ReportQuery> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => StatusFilter::All,
            Some(value) if value.eq_ignore_ascii_case("all") => StatusFilter::All,
            Some(value) => ReportStatus::parse(value)
                .map(StatusFilter::Only)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown status filter '{}'", value)))?,
        };

        Ok(ReportQuery {
            status,
            severity_threshold: self.urgent.then_some(URGENT_SEVERITY),
            newest_first: self.sort == SortOrder::Newest,
        })
    }
}

/// Query params for the popular view
#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams)]
pub struct PopularQuery {
    /// Maximum number of reports to return (unlimited when omitted)
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: Option<usize>,
}
