use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{normalize_key, ReportCategory};
use crate::shared::constants::DEFAULT_SEVERITY;

/// Report lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    New,
    InProgress,
    Completed,
    Rejected,
}

impl ReportStatus {
    pub const ALL: [ReportStatus; 4] = [
        ReportStatus::New,
        ReportStatus::InProgress,
        ReportStatus::Completed,
        ReportStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::New => "new",
            ReportStatus::InProgress => "in_progress",
            ReportStatus::Completed => "completed",
            ReportStatus::Rejected => "rejected",
        }
    }

    /// Label shown by the mobile client
    pub fn label_id(&self) -> &'static str {
        match self {
            ReportStatus::New => "Baru",
            ReportStatus::InProgress => "Diproses",
            ReportStatus::Completed => "Selesai",
            ReportStatus::Rejected => "Ditolak",
        }
    }

    /// Parse a stored or client-supplied value. Accepts the canonical key,
    /// the English name and the Indonesian label; anything else is `New`.
    pub fn from_str_or_default(value: &str) -> Self {
        Self::parse(value).unwrap_or(ReportStatus::New)
    }

    /// Strict variant of [`ReportStatus::from_str_or_default`].
    pub fn parse(value: &str) -> Option<Self> {
        let key = normalize_key(value);
        Self::ALL.into_iter().find(|status| {
            normalize_key(status.as_str()) == key || normalize_key(status.label_id()) == key
        })
    }

    /// Completed and Rejected accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReportStatus::Completed | ReportStatus::Rejected)
    }

    /// New -> InProgress -> Completed, and New/InProgress -> Rejected.
    /// Nothing ever moves back to New.
    pub fn can_transition_to(&self, next: ReportStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        matches!(
            (self, next),
            (ReportStatus::New, ReportStatus::InProgress)
                | (ReportStatus::New, ReportStatus::Rejected)
                | (ReportStatus::InProgress, ReportStatus::Completed)
                | (ReportStatus::InProgress, ReportStatus::Rejected)
        )
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Report handling priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportPriority {
    Low,
    Medium,
    High,
}

impl ReportPriority {
    pub const ALL: [ReportPriority; 3] = [
        ReportPriority::Low,
        ReportPriority::Medium,
        ReportPriority::High,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportPriority::Low => "low",
            ReportPriority::Medium => "medium",
            ReportPriority::High => "high",
        }
    }

    pub fn label_id(&self) -> &'static str {
        match self {
            ReportPriority::Low => "Rendah",
            ReportPriority::Medium => "Sedang",
            ReportPriority::High => "Tinggi",
        }
    }

    /// Unknown values fall back to `Medium`.
    pub fn from_str_or_default(value: &str) -> Self {
        let key = normalize_key(value);
        Self::ALL
            .into_iter()
            .find(|p| normalize_key(p.as_str()) == key || normalize_key(p.label_id()) == key)
            .unwrap_or(ReportPriority::Medium)
    }
}

impl std::fmt::Display for ReportPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Validated report as consumed by the aggregation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Report {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: ReportCategory,
    pub status: ReportStatus,
    pub priority: ReportPriority,
    /// 1 (minor) to 5 (critical)
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

/// Raw `reports` row. Status, category and priority are stored as text and
/// mapped through the enum fallbacks; the numeric ranges are checked before
/// the row becomes a [`Report`].
#[derive(Debug, Clone, FromRow, Validate)]
pub struct ReportRow {
    #[validate(length(min = 1, message = "id is required"))]
    pub id: String,
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    pub description: String,
    pub category: String,
    pub status: String,
    pub priority: String,
    #[validate(range(min = 1, max = 5, message = "severity must be between 1 and 5"))]
    pub severity: Option<i16>,
    #[validate(range(min = -90.0, max = 90.0, message = "latitude out of range"))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "longitude out of range"))]
    pub longitude: f64,
    pub location_name: String,
    pub address: String,
    pub photo_id: Option<String>,
    pub completion_photo_id: Option<String>,
    #[validate(range(min = 0, message = "votes must not be negative"))]
    pub votes: i32,
    #[validate(length(min = 1, message = "user_id is required"))]
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ReportRow> for Report {
    type Error = validator::ValidationErrors;

    fn try_from(row: ReportRow) -> Result<Self, Self::Error> {
        row.validate()?;

        // Both casts are in range after validation
        let severity = row.severity.unwrap_or(DEFAULT_SEVERITY) as u8;
        let votes = row.votes as u32;

        Ok(Report {
            category: ReportCategory::from_str_or_default(&row.category),
            status: ReportStatus::from_str_or_default(&row.status),
            priority: ReportPriority::from_str_or_default(&row.priority),
            id: row.id,
            title: row.title,
            description: row.description,
            severity,
            latitude: row.latitude,
            longitude: row.longitude,
            location_name: row.location_name,
            address: row.address,
            photo_id: row.photo_id,
            completion_photo_id: row.completion_photo_id,
            votes,
            user_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> ReportRow {
        let now = Utc::now();
        ReportRow {
            id: "rpt-1".to_string(),
            title: "Jalan berlubang".to_string(),
            description: "Lubang besar di depan pasar".to_string(),
            category: "Jalan Rusak".to_string(),
            status: "Diproses".to_string(),
            priority: "Tinggi".to_string(),
            severity: None,
            latitude: -6.2088,
            longitude: 106.8456,
            location_name: "Pasar Minggu".to_string(),
            address: "Jl. Raya Pasar Minggu".to_string(),
            photo_id: None,
            completion_photo_id: None,
            votes: 4,
            user_id: "user-1".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_parsing_accepts_keys_and_labels() {
        assert_eq!(ReportStatus::from_str_or_default("in_progress"), ReportStatus::InProgress);
        assert_eq!(ReportStatus::from_str_or_default("InProgress"), ReportStatus::InProgress);
        assert_eq!(ReportStatus::from_str_or_default("Selesai"), ReportStatus::Completed);
        assert_eq!(ReportStatus::from_str_or_default(" ditolak "), ReportStatus::Rejected);
        assert_eq!(ReportStatus::from_str_or_default("archived"), ReportStatus::New);
        assert_eq!(ReportStatus::parse("archived"), None);
    }

    #[test]
    fn test_priority_unknown_falls_back_to_medium() {
        assert_eq!(ReportPriority::from_str_or_default("Rendah"), ReportPriority::Low);
        assert_eq!(ReportPriority::from_str_or_default("HIGH"), ReportPriority::High);
        assert_eq!(ReportPriority::from_str_or_default("urgent"), ReportPriority::Medium);
    }

    #[test]
    fn test_status_transitions_are_monotonic() {
        use ReportStatus::*;
        assert!(New.can_transition_to(InProgress));
        assert!(New.can_transition_to(Rejected));
        assert!(InProgress.can_transition_to(Completed));
        assert!(InProgress.can_transition_to(Rejected));

        assert!(!InProgress.can_transition_to(New));
        assert!(!Completed.can_transition_to(New));
        assert!(!Completed.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(InProgress));
        assert!(!New.can_transition_to(Completed));
        assert!(Completed.is_terminal() && Rejected.is_terminal());
    }

    #[test]
    fn test_row_conversion_applies_defaults() {
        let report = Report::try_from(row()).unwrap();
        assert_eq!(report.severity, 3);
        assert_eq!(report.status, ReportStatus::InProgress);
        assert_eq!(report.priority, ReportPriority::High);
        assert_eq!(report.category, ReportCategory::RoadDamage);
        assert_eq!(report.votes, 4);
    }

    #[test]
    fn test_row_conversion_rejects_malformed_records() {
        let mut bad_severity = row();
        bad_severity.severity = Some(9);
        assert!(Report::try_from(bad_severity).is_err());

        let mut negative_votes = row();
        negative_votes.votes = -1;
        assert!(Report::try_from(negative_votes).is_err());

        let mut missing_owner = row();
        missing_owner.user_id = String::new();
        assert!(Report::try_from(missing_owner).is_err());

        let mut bad_latitude = row();
        bad_latitude.latitude = 120.0;
        assert!(Report::try_from(bad_latitude).is_err());
    }
}
