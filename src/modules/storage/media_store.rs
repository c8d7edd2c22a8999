use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::core::error::Result;
use crate::modules::imaging::CompressedImage;

/// Where a stored photo ended up
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PhotoRef {
    /// Identifier referenced by `photo_id` / `completion_photo_id` on reports
    pub photo_id: String,
    /// Object key inside the bucket
    pub key: String,
    pub url: String,
}

/// Destination for compressed report photos.
///
/// Implementations take ownership of the encoded buffer.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn store(&self, image: CompressedImage, owner: &str) -> Result<PhotoRef>;
}

/// Object path for a report photo, relative to the public prefix
pub fn photo_path(owner: &str, photo_id: &str) -> String {
    format!("report-photos/{}/{}.jpg", owner, photo_id)
}
