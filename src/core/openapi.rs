use utoipa::{Modify, OpenApi};

use crate::features::lifecycle::{dtos as lifecycle_dtos, handlers as lifecycle_handlers};
use crate::features::photos::{dtos as photos_dtos, handlers as photos_handlers};
use crate::features::preferences::{dtos as preferences_dtos, handlers as preferences_handlers};
use crate::features::reports::aggregation::{SweepSelection, UserStats};
use crate::features::reports::{
    dtos as reports_dtos, handlers as reports_handlers, models as reports_models,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Reports
        reports_handlers::list_reports,
        reports_handlers::popular_reports,
        reports_handlers::list_user_reports,
        reports_handlers::user_stats,
        // Photos
        photos_handlers::upload_photo,
        // Lifecycle
        lifecycle_handlers::lifecycle_status,
        // Preferences
        preferences_handlers::get_dark_mode,
        preferences_handlers::set_dark_mode,
    ),
    components(
        schemas(
            Meta,
            // Reports
            reports_models::ReportStatus,
            reports_models::ReportPriority,
            reports_models::ReportCategory,
            reports_dtos::SortOrder,
            reports_dtos::ReportResponseDto,
            UserStats,
            ApiResponse<Vec<reports_dtos::ReportResponseDto>>,
            ApiResponse<UserStats>,
            // Photos
            photos_dtos::UploadPhotoDto,
            photos_dtos::PhotoResponseDto,
            ApiResponse<photos_dtos::PhotoResponseDto>,
            // Lifecycle
            SweepSelection,
            lifecycle_dtos::LifecycleStatusDto,
            ApiResponse<lifecycle_dtos::LifecycleStatusDto>,
            // Preferences
            preferences_dtos::DarkModeDto,
            ApiResponse<preferences_dtos::DarkModeDto>,
        )
    ),
    tags(
        (name = "reports", description = "Citizen report listings, popularity and user statistics"),
        (name = "photos", description = "Report photo compression and upload"),
        (name = "lifecycle", description = "Expiry sweep scheduling"),
        (name = "preferences", description = "Persisted client settings"),
    ),
    info(
        title = "Balungpisah Report Pipeline",
        version = "0.1.0",
        description = "Report aggregation, lifecycle sweeps and photo compression",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/reports",
            "/api/reports/popular",
            "/api/users/{user_id}/reports",
            "/api/users/{user_id}/stats",
            "/api/photos",
            "/api/lifecycle/status",
            "/api/preferences/dark-mode",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn test_info_modifier_overrides_title() {
        let mut doc = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Custom".to_string(),
            version: "9.9.9".to_string(),
            description: "desc".to_string(),
        }
        .modify(&mut doc);
        assert_eq!(doc.info.title, "Custom");
        assert_eq!(doc.info.version, "9.9.9");
    }
}
