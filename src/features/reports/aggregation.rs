//! Derived views over a report snapshot.
//!
//! Every function here is pure: it reads a slice fixed at call time and
//! returns owned results, so callers may run them concurrently without
//! coordination. Empty input always produces an empty or zeroed result.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::features::reports::models::{Report, ReportStatus};
use crate::shared::constants::POPULARITY_WINDOW_DAYS;

/// Status selection for [`filter_and_sort`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ReportStatus),
}

impl StatusFilter {
    fn matches(&self, status: ReportStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

/// Per-user resolution statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UserStats {
    pub total_reports: u32,
    pub resolved_count: u32,
    pub total_votes: u64,
    pub last_report_date: Option<DateTime<Utc>>,
    /// `round(resolved_count / total_reports * 100)`, 0 for no reports
    pub resolved_percentage: u32,
    /// `total_votes / total_reports` truncated, 0 for no reports
    pub average_votes: u64,
}

/// Ids picked by an expiry sweep
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct SweepSelection {
    pub closed_ids: Vec<String>,
    pub count: usize,
}

/// Filter by status and minimum severity, then order by `created_at`.
///
/// The sort is stable, so reports created at the same instant keep their
/// snapshot order in both directions.
pub fn filter_and_sort(
    reports: &[Report],
    status_filter: StatusFilter,
    severity_threshold: Option<u8>,
    newest_first: bool,
) -> Vec<Report> {
    let mut selected: Vec<Report> = reports
        .iter()
        .filter(|r| status_filter.matches(r.status))
        .filter(|r| severity_threshold.map_or(true, |min| r.severity >= min))
        .cloned()
        .collect();

    if newest_first {
        selected.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    } else {
        selected.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    }

    selected
}

/// Reports created in `[now - 7d, now)`, most voted first.
///
/// Equal vote counts are ordered by `created_at` descending; exact ties keep
/// snapshot order. `top_n` truncates after sorting.
pub fn popular_this_week(
    reports: &[Report],
    now: DateTime<Utc>,
    top_n: Option<usize>,
) -> Vec<Report> {
    let window_start = now - Duration::days(POPULARITY_WINDOW_DAYS);

    let mut selected: Vec<Report> = reports
        .iter()
        .filter(|r| r.created_at >= window_start && r.created_at < now)
        .cloned()
        .collect();

    selected.sort_by(|a, b| {
        b.votes
            .cmp(&a.votes)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });

    if let Some(limit) = top_n {
        selected.truncate(limit);
    }

    selected
}

pub fn stats_for_user(reports: &[Report], user_id: &str) -> UserStats {
    let mut total_reports: u32 = 0;
    let mut resolved_count: u32 = 0;
    let mut total_votes: u64 = 0;
    let mut last_report_date: Option<DateTime<Utc>> = None;

    for report in reports.iter().filter(|r| r.user_id == user_id) {
        total_reports += 1;
        if report.status == ReportStatus::Completed {
            resolved_count += 1;
        }
        total_votes += u64::from(report.votes);
        last_report_date = Some(match last_report_date {
            Some(latest) if latest >= report.created_at => latest,
            _ => report.created_at,
        });
    }

    let (resolved_percentage, average_votes) = if total_reports == 0 {
        (0, 0)
    } else {
        let percentage =
            (f64::from(resolved_count) / f64::from(total_reports) * 100.0).round() as u32;
        (percentage, total_votes / u64::from(total_reports))
    };

    UserStats {
        total_reports,
        resolved_count,
        total_votes,
        last_report_date,
        resolved_percentage,
        average_votes,
    }
}

/// Select completed reports untouched for at least `expiry_after`.
///
/// Completed is terminal, so nothing is transitioned; the returned ids are
/// for an archival or notification step to act on.
pub fn sweep_expired(
    reports: &[Report],
    now: DateTime<Utc>,
    expiry_after: Duration,
) -> SweepSelection {
    let closed_ids: Vec<String> = reports
        .iter()
        .filter(|r| r.status == ReportStatus::Completed)
        .filter(|r| now - r.updated_at >= expiry_after)
        .map(|r| r.id.clone())
        .collect();

    SweepSelection {
        count: closed_ids.len(),
        closed_ids,
    }
}
