use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::preferences::dtos::DarkModeDto;
use crate::features::preferences::services::PreferenceService;
use crate::shared::types::ApiResponse;

/// Read the dark mode preference
#[utoipa::path(
    get,
    path = "/api/preferences/dark-mode",
    responses(
        (status = 200, description = "Dark mode preference", body = ApiResponse<DarkModeDto>),
        (status = 503, description = "Preference store unavailable")
    ),
    tag = "preferences"
)]
pub async fn get_dark_mode(
    State(service): State<Arc<PreferenceService>>,
) -> Result<Json<ApiResponse<DarkModeDto>>> {
    let enabled = service.dark_mode().await?;
    Ok(Json(ApiResponse::success(
        Some(DarkModeDto { enabled }),
        None,
        None,
    )))
}

/// Switch dark mode on or off
#[utoipa::path(
    put,
    path = "/api/preferences/dark-mode",
    request_body = DarkModeDto,
    responses(
        (status = 200, description = "Preference saved", body = ApiResponse<DarkModeDto>),
        (status = 400, description = "Invalid body"),
        (status = 503, description = "Preference store unavailable")
    ),
    tag = "preferences"
)]
pub async fn set_dark_mode(
    State(service): State<Arc<PreferenceService>>,
    AppJson(dto): AppJson<DarkModeDto>,
) -> Result<Json<ApiResponse<DarkModeDto>>> {
    let enabled = service.set_dark_mode(dto.enabled).await?;
    Ok(Json(ApiResponse::success(
        Some(DarkModeDto { enabled }),
        Some("Preference saved".to_string()),
        None,
    )))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use std::sync::Arc;

    use crate::features::preferences::{routes, PreferenceService};
    use crate::shared::test_helpers::InMemoryPreferenceStore;

    #[tokio::test]
    async fn test_dark_mode_round_trip_over_http() {
        let service = Arc::new(PreferenceService::new(Arc::new(
            InMemoryPreferenceStore::new(),
        )));
        let server = TestServer::new(routes(service)).unwrap();

        let body: Value = server.get("/api/preferences/dark-mode").await.json();
        assert_eq!(body["data"]["enabled"], false);

        server
            .put("/api/preferences/dark-mode")
            .json(&json!({ "enabled": true }))
            .await
            .assert_status_ok();

        let body: Value = server.get("/api/preferences/dark-mode").await.json();
        assert_eq!(body["data"]["enabled"], true);
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let service = Arc::new(PreferenceService::new(Arc::new(
            InMemoryPreferenceStore::new(),
        )));
        let server = TestServer::new(routes(service)).unwrap();

        let response = server
            .put("/api/preferences/dark-mode")
            .json(&json!({ "enabled": "sometimes" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
