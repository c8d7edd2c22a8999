use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::core::error::Result;
use crate::features::reports::aggregation::{self, StatusFilter, UserStats};
use crate::features::reports::models::Report;
use crate::features::reports::services::ReportStore;

/// Query options for report listings
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportQuery {
    pub status: StatusFilter,
    pub severity_threshold: Option<u8>,
    pub newest_first: bool,
}

/// Service for read-only report views
///
/// Each call takes a fresh snapshot from the store and hands it to the
/// aggregation functions.
pub struct ReportService {
    store: Arc<dyn ReportStore>,
}

impl ReportService {
    pub fn new(store: Arc<dyn ReportStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, query: ReportQuery) -> Result<Vec<Report>> {
        let snapshot = self.store.fetch_all().await?;
        Ok(aggregation::filter_and_sort(
            &snapshot,
            query.status,
            query.severity_threshold,
            query.newest_first,
        ))
    }

    pub async fn list_for_user(&self, user_id: &str, query: ReportQuery) -> Result<Vec<Report>> {
        let snapshot = self.store.fetch_for_user(user_id).await?;
        Ok(aggregation::filter_and_sort(
            &snapshot,
            query.status,
            query.severity_threshold,
            query.newest_first,
        ))
    }

    pub async fn popular_this_week(
        &self,
        now: DateTime<Utc>,
        top_n: Option<usize>,
    ) -> Result<Vec<Report>> {
        let snapshot = self.store.fetch_all().await?;
        Ok(aggregation::popular_this_week(&snapshot, now, top_n))
    }

    pub async fn stats_for_user(&self, user_id: &str) -> Result<UserStats> {
        let snapshot = self.store.fetch_for_user(user_id).await?;
        Ok(aggregation::stats_for_user(&snapshot, user_id))
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AppError;
    use crate::features::reports::models::ReportStatus;
    use crate::shared::test_helpers::{report_fixture, InMemoryReportStore};
    use chrono::Duration;

    fn service(reports: Vec<Report>) -> (ReportService, Arc<InMemoryReportStore>) {
        let store = Arc::new(InMemoryReportStore::new(reports));
        (ReportService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_stats_only_counts_the_requested_user() {
        let mut mine = report_fixture("a", "user-1");
        mine.status = ReportStatus::Completed;
        mine.votes = 4;
        let theirs = report_fixture("b", "user-2");
        let (service, _) = service(vec![mine, theirs]);

        let stats = service.stats_for_user("user-1").await.unwrap();
        assert_eq!(stats.total_reports, 1);
        assert_eq!(stats.resolved_percentage, 100);
        assert_eq!(stats.average_votes, 4);
    }

    #[tokio::test]
    async fn test_popular_uses_fresh_snapshot() {
        let now = Utc::now();
        let mut hot = report_fixture("hot", "user-1");
        hot.votes = 10;
        hot.created_at = now - Duration::days(1);
        let (service, store) = service(vec![hot]);

        assert_eq!(service.popular_this_week(now, None).await.unwrap().len(), 1);

        store.replace(Vec::new());
        assert!(service.popular_this_week(now, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_status_change_shows_in_next_snapshot() {
        let (service, store) = service(vec![report_fixture("r1", "user-1")]);

        tokio_test::assert_ok!(store.apply_status_change("r1", ReportStatus::InProgress).await);

        let in_progress = ReportQuery {
            status: StatusFilter::Only(ReportStatus::InProgress),
            ..ReportQuery::default()
        };
        let reports = service.list(in_progress).await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].id, "r1");

        let backwards = store.apply_status_change("r1", ReportStatus::New).await;
        assert!(matches!(backwards, Err(AppError::Conflict(_))));
        assert_eq!(store.status_of("r1"), Some(ReportStatus::InProgress));
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let (service, store) = service(vec![report_fixture("r1", "user-1")]);
        store.set_unavailable(true);

        let err = service.list(ReportQuery::default()).await.unwrap_err();
        assert!(matches!(err, AppError::StoreUnavailable(_)));
    }
}
