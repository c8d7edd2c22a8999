use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppQuery;
use crate::features::reports::aggregation::UserStats;
use crate::features::reports::dtos::{PopularQuery, ReportListQuery, ReportResponseDto};
use crate::features::reports::models::Report;
use crate::features::reports::services::ReportService;
use crate::shared::types::{ApiResponse, Meta};

fn to_response(reports: Vec<Report>) -> Json<ApiResponse<Vec<ReportResponseDto>>> {
    let total = reports.len() as i64;
    let dtos: Vec<ReportResponseDto> = reports.into_iter().map(ReportResponseDto::from).collect();
    Json(ApiResponse::success(Some(dtos), None, Some(Meta { total })))
}

/// List reports filtered by status/urgency and ordered by creation time
#[utoipa::path(
    get,
    path = "/api/reports",
    params(ReportListQuery),
    responses(
        (status = 200, description = "Filtered reports", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 400, description = "Unknown status filter"),
        (status = 503, description = "Report store unavailable")
    ),
    tag = "reports"
)]
pub async fn list_reports(
    State(service): State<Arc<ReportService>>,
    AppQuery(params): AppQuery<ReportListQuery>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let reports = service.list(params.to_query()?).await?;
    Ok(to_response(reports))
}

/// Most voted reports created in the last 7 days
#[utoipa::path(
    get,
    path = "/api/reports/popular",
    params(PopularQuery),
    responses(
        (status = 200, description = "Popular reports this week", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 400, description = "Invalid limit"),
        (status = 503, description = "Report store unavailable")
    ),
    tag = "reports"
)]
pub async fn popular_reports(
    State(service): State<Arc<ReportService>>,
    AppQuery(params): AppQuery<PopularQuery>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    params
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let reports = service.popular_this_week(Utc::now(), params.limit).await?;
    Ok(to_response(reports))
}

/// List one user's reports
#[utoipa::path(
    get,
    path = "/api/users/{user_id}/reports",
    params(
        ("user_id" = String, Path, description = "Owner of the reports"),
        ReportListQuery
    ),
    responses(
        (status = 200, description = "User's reports", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 503, description = "Report store unavailable")
    ),
    tag = "reports"
)]
pub async fn list_user_reports(
    State(service): State<Arc<ReportService>>,
    Path(user_id): Path<String>,
    AppQuery(params): AppQuery<ReportListQuery>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let reports = service.list_for_user(&user_id, params.to_query()?).await?;
    Ok(to_response(reports))
}

/// Resolution statistics for one user
#[utoipa::path(
    get,
    path = "/api/users/{user_id}/stats",
    params(
        ("user_id" = String, Path, description = "User to summarize")
    ),
    responses(
        (status = 200, description = "User statistics", body = ApiResponse<UserStats>),
        (status = 503, description = "Report store unavailable")
    ),
    tag = "reports"
)]
pub async fn user_stats(
    State(service): State<Arc<ReportService>>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<UserStats>>> {
    let stats = service.stats_for_user(&user_id).await?;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}
