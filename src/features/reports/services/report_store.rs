use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::reports::models::{Report, ReportRow, ReportStatus};

/// Source of report snapshots and sink for status changes
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Report>>;

    async fn fetch_for_user(&self, user_id: &str) -> Result<Vec<Report>>;

    async fn apply_status_change(&self, report_id: &str, new_status: ReportStatus) -> Result<()>;
}

const SELECT_REPORTS: &str = r#"
    SELECT
        id, title, description, category, status, priority, severity,
        latitude, longitude, location_name, address,
        photo_id, completion_photo_id, votes, user_id,
        created_at, updated_at
    FROM reports
"#;

/// Convert raw rows, dropping (and logging) the ones that fail validation.
pub fn rows_into_reports(rows: Vec<ReportRow>) -> Vec<Report> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id.clone();
            match Report::try_from(row) {
                Ok(report) => Some(report),
                Err(e) => {
                    tracing::warn!("Skipping malformed report '{}': {}", id, e);
                    None
                }
            }
        })
        .collect()
}

/// Postgres-backed report store
pub struct PgReportStore {
    pool: PgPool,
}

impl PgReportStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Stored status text together with its parsed value
    async fn current_status(&self, report_id: &str) -> Result<(String, ReportStatus)> {
        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM reports WHERE id = $1")
                .bind(report_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to read report status: {:?}", e);
                    AppError::StoreUnavailable(e.to_string())
                })?;

        status
            .map(|raw| {
                let parsed = ReportStatus::from_str_or_default(&raw);
                (raw, parsed)
            })
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", report_id)))
    }
}

#[async_trait]
impl ReportStore for PgReportStore {
    async fn fetch_all(&self) -> Result<Vec<Report>> {
        let query = format!("{} ORDER BY created_at", SELECT_REPORTS);
        let rows = sqlx::query_as::<_, ReportRow>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch reports: {:?}", e);
                AppError::StoreUnavailable(e.to_string())
            })?;

        Ok(rows_into_reports(rows))
    }

    async fn fetch_for_user(&self, user_id: &str) -> Result<Vec<Report>> {
        let query = format!("{} WHERE user_id = $1 ORDER BY created_at", SELECT_REPORTS);
        let rows = sqlx::query_as::<_, ReportRow>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch reports for user {}: {:?}", user_id, e);
                AppError::StoreUnavailable(e.to_string())
            })?;

        Ok(rows_into_reports(rows))
    }

    async fn apply_status_change(&self, report_id: &str, new_status: ReportStatus) -> Result<()> {
        let (stored, current) = self.current_status(report_id).await?;
        if current == new_status {
            return Ok(());
        }
        if !current.can_transition_to(new_status) {
            return Err(AppError::Conflict(format!(
                "Report {} cannot move from {} to {}",
                report_id, current, new_status
            )));
        }

        // Guard on the status we checked so a concurrent writer cannot be overwritten
        let result = sqlx::query(
            "UPDATE reports SET status = $2, updated_at = NOW() WHERE id = $1 AND status = $3",
        )
        .bind(report_id)
        .bind(new_status.as_str())
        .bind(&stored)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update report status: {:?}", e);
            AppError::StoreUnavailable(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "Report {} changed status concurrently",
                report_id
            )));
        }

        tracing::info!("Report {} status: {} -> {}", report_id, current, new_status);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn row(id: &str, severity: Option<i16>) -> ReportRow {
        let now = Utc::now();
        ReportRow {
            id: id.to_string(),
            title: "Sampah menumpuk".to_string(),
            description: String::new(),
            category: "garbage".to_string(),
            status: "new".to_string(),
            priority: "medium".to_string(),
            severity,
            latitude: -7.25,
            longitude: 112.75,
            location_name: "Surabaya".to_string(),
            address: String::new(),
            photo_id: None,
            completion_photo_id: None,
            votes: 0,
            user_id: "user-1".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let reports = rows_into_reports(vec![row("ok", Some(2)), row("bad", Some(0)), row("", None)]);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].id, "ok");
        assert_eq!(reports[0].severity, 2);
    }
}
