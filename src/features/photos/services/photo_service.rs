use std::sync::Arc;

use tracing::{debug, info};

use crate::core::config::ImageConfig;
use crate::core::error::{AppError, Result};
use crate::features::photos::dtos::{is_valid_owner, CompressedSummary, PhotoResponseDto};
use crate::modules::imaging::{ImageOptions, ImagePipeline};
use crate::modules::storage::MediaStore;

/// Compresses uploaded photos and hands them to the media store
pub struct PhotoService {
    pipeline: ImagePipeline,
    media_store: Arc<dyn MediaStore>,
    max_upload_size: usize,
}

impl PhotoService {
    pub fn new(config: &ImageConfig, media_store: Arc<dyn MediaStore>) -> Self {
        Self {
            pipeline: ImagePipeline::new(ImageOptions::from(config)),
            media_store,
            max_upload_size: config.max_upload_size,
        }
    }

    pub fn max_upload_size(&self) -> usize {
        self.max_upload_size
    }

    /// Compress `data` off the async runtime, then store the JPEG under `owner`
    pub async fn upload(&self, data: Vec<u8>, owner: &str) -> Result<PhotoResponseDto> {
        if !is_valid_owner(owner) {
            return Err(AppError::Validation(format!("Invalid user_id '{}'", owner)));
        }
        if data.is_empty() {
            return Err(AppError::BadRequest("Photo is empty".to_string()));
        }
        if data.len() > self.max_upload_size {
            return Err(AppError::BadRequest(format!(
                "Photo too large. Maximum size is {} bytes ({} MB)",
                self.max_upload_size,
                self.max_upload_size / 1024 / 1024
            )));
        }

        let original_byte_length = data.len();
        let pipeline = self.pipeline.clone();
        let compressed = tokio::task::spawn_blocking(move || pipeline.compress(&data))
            .await
            .map_err(|e| {
                tracing::error!("Image compression task failed: {:?}", e);
                AppError::Internal(format!("Image compression task failed: {}", e))
            })??;

        debug!(
            "Compressed photo for {}: {} -> {} bytes",
            owner,
            original_byte_length,
            compressed.byte_len()
        );

        let summary = CompressedSummary::from(&compressed);
        let photo = self.media_store.store(compressed, owner).await?;

        info!("Photo {} uploaded by {}", photo.photo_id, owner);

        Ok(PhotoResponseDto::new(photo, summary, original_byte_length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{sample_jpeg, InMemoryMediaStore};

    fn service(store: Arc<InMemoryMediaStore>, max_width: u32) -> PhotoService {
        let config = ImageConfig {
            max_width,
            max_height: max_width,
            ..ImageConfig::default()
        };
        PhotoService::new(&config, store)
    }

    #[tokio::test]
    async fn test_upload_compresses_and_stores() {
        let store = Arc::new(InMemoryMediaStore::new());
        let service = service(store.clone(), 32);

        let response = service.upload(sample_jpeg(64, 48), "warga-1").await.unwrap();

        assert_eq!((response.width, response.height), (32, 24));
        assert_eq!(store.stored_count(), 1);
        assert!(response.url.contains("report-photos/warga-1/"));
        assert!(response.url.ends_with(".jpg"));
    }

    #[tokio::test]
    async fn test_undecodable_upload_is_not_stored() {
        let store = Arc::new(InMemoryMediaStore::new());
        let service = service(store.clone(), 1024);

        let err = service
            .upload(b"plain text".to_vec(), "warga-1")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Decode(_)));
        assert_eq!(store.stored_count(), 0);
    }

    #[tokio::test]
    async fn test_rejects_bad_owner_and_empty_body() {
        let store = Arc::new(InMemoryMediaStore::new());
        let service = service(store, 1024);

        assert!(matches!(
            service.upload(sample_jpeg(8, 8), "../x").await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            service.upload(Vec::new(), "warga-1").await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_store_outage_surfaces() {
        let store = Arc::new(InMemoryMediaStore::new());
        store.set_unavailable(true);
        let service = service(store, 1024);

        let result = service.upload(sample_jpeg(8, 8), "warga-1").await;
        assert!(matches!(result, Err(AppError::StoreUnavailable(_))));
    }
}
