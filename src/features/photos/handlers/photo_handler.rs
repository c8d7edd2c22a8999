use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::debug;

use crate::core::error::AppError;
use crate::features::photos::dtos::{PhotoResponseDto, UploadPhotoDto};
use crate::features::photos::services::PhotoService;
use crate::shared::types::ApiResponse;

/// Upload a report photo
///
/// Accepts multipart/form-data with:
/// - `file`: the source image (required)
/// - `user_id`: owner of the photo (required)
///
/// The image is downsampled, oriented, fitted into the configured bounds and
/// re-encoded as JPEG before it is stored.
#[utoipa::path(
    post,
    path = "/api/photos",
    tag = "photos",
    request_body(
        content = UploadPhotoDto,
        content_type = "multipart/form-data",
        description = "Photo file and owning user id",
    ),
    responses(
        (status = 201, description = "Photo compressed and stored", body = ApiResponse<PhotoResponseDto>),
        (status = 400, description = "Missing field, empty or oversized file"),
        (status = 413, description = "Request body too large"),
        (status = 422, description = "File is not a readable image"),
        (status = 503, description = "Photo storage unavailable")
    )
)]
pub async fn upload_photo(
    State(service): State<Arc<PhotoService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<PhotoResponseDto>>), AppError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut user_id: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read file bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;
                file_data = Some(data.to_vec());
            }
            "user_id" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read user_id field: {}", e))
                })?;
                user_id = Some(text.trim().to_string());
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let file_data =
        file_data.ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;
    let user_id = user_id.ok_or_else(|| AppError::BadRequest("user_id is required".to_string()))?;

    let response = service.upload(file_data, &user_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(response),
            Some("Photo uploaded".to_string()),
            None,
        )),
    ))
}
