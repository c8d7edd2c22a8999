use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::normalize_key;

/// Civic issue category of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportCategory {
    RoadDamage,
    Garbage,
    Flooding,
    StreetLighting,
    Drainage,
    PublicFacility,
    Security,
    Other,
}

impl ReportCategory {
    pub const ALL: [ReportCategory; 8] = [
        ReportCategory::RoadDamage,
        ReportCategory::Garbage,
        ReportCategory::Flooding,
        ReportCategory::StreetLighting,
        ReportCategory::Drainage,
        ReportCategory::PublicFacility,
        ReportCategory::Security,
        ReportCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportCategory::RoadDamage => "road_damage",
            ReportCategory::Garbage => "garbage",
            ReportCategory::Flooding => "flooding",
            ReportCategory::StreetLighting => "street_lighting",
            ReportCategory::Drainage => "drainage",
            ReportCategory::PublicFacility => "public_facility",
            ReportCategory::Security => "security",
            ReportCategory::Other => "other",
        }
    }

    /// Label shown by the mobile client
    pub fn label_id(&self) -> &'static str {
        match self {
            ReportCategory::RoadDamage => "Jalan Rusak",
            ReportCategory::Garbage => "Sampah",
            ReportCategory::Flooding => "Banjir",
            ReportCategory::StreetLighting => "Lampu Jalan",
            ReportCategory::Drainage => "Saluran Air",
            ReportCategory::PublicFacility => "Fasilitas Umum",
            ReportCategory::Security => "Keamanan",
            ReportCategory::Other => "Lainnya",
        }
    }

    /// Unknown values fall back to `Other`.
    pub fn from_str_or_default(value: &str) -> Self {
        let key = normalize_key(value);
        Self::ALL
            .into_iter()
            .find(|c| normalize_key(c.as_str()) == key || normalize_key(c.label_id()) == key)
            .unwrap_or(ReportCategory::Other)
    }
}

impl std::fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
