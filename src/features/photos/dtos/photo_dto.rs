use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::modules::imaging::CompressedImage;
use crate::modules::storage::PhotoRef;

/// Multipart form for a photo upload (documentation only)
#[derive(Debug, Deserialize, ToSchema)]
#[allow(dead_code)]
pub struct UploadPhotoDto {
    /// Source image (JPEG, PNG or WebP)
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// Owner of the photo, used in the storage path
    #[schema(example = "warga-12")]
    pub user_id: String,
}

/// Response DTO for a stored photo
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PhotoResponseDto {
    pub photo_id: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
    /// Size of the compressed JPEG
    pub byte_length: usize,
    /// Size of the uploaded source
    pub original_byte_length: usize,
}

impl PhotoResponseDto {
    pub fn new(photo: PhotoRef, summary: CompressedSummary, original_byte_length: usize) -> Self {
        Self {
            photo_id: photo.photo_id,
            url: photo.url,
            width: summary.width,
            height: summary.height,
            byte_length: summary.byte_length,
            original_byte_length,
        }
    }
}

/// Dimensions and size of a compressed image, kept after its buffer is
/// handed to the store.
#[derive(Debug, Clone, Copy)]
pub struct CompressedSummary {
    pub width: u32,
    pub height: u32,
    pub byte_length: usize,
}

impl From<&CompressedImage> for CompressedSummary {
    fn from(image: &CompressedImage) -> Self {
        Self {
            width: image.width,
            height: image.height,
            byte_length: image.byte_len(),
        }
    }
}

/// Owner ids end up in object keys, so only a conservative charset passes
pub fn is_valid_owner(user_id: &str) -> bool {
    !user_id.is_empty()
        && user_id.len() <= 128
        && user_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !user_id.starts_with('.')
}
