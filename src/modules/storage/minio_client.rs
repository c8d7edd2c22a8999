//! MinIO/S3-compatible storage for report photos
//!
//! Uses the rust-s3 crate with path-style addressing.

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::media_store::{photo_path, MediaStore, PhotoRef};
use crate::core::config::MinIOConfig;
use crate::core::error::{AppError, Result};
use crate::modules::imaging::CompressedImage;

pub struct MinIOClient {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    endpoint: String,
    public_endpoint: String,
    public_prefix: String,
}

impl MinIOClient {
    /// Create a client and make sure the bucket exists
    pub async fn new(config: MinIOConfig) -> Result<Self> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Internal(format!("Failed to create MinIO credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| AppError::Internal(format!("Failed to create MinIO bucket: {}", e)))?;

        // http://endpoint/bucket instead of http://bucket.endpoint
        bucket.set_path_style();

        let client = Self {
            bucket,
            region,
            credentials,
            endpoint: config.endpoint,
            public_endpoint: config.public_endpoint,
            public_prefix: config.public_prefix,
        };

        client.ensure_bucket_exists().await;

        info!(
            "MinIO client initialized for endpoint: {}, bucket: {}, public_prefix: {}",
            client.endpoint,
            client.bucket.name(),
            client.public_prefix
        );

        Ok(client)
    }

    /// Create the bucket if missing. Failures are logged, uploads will
    /// surface any real problem.
    async fn ensure_bucket_exists(&self) {
        let created = Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await;

        match created {
            Ok(_) => info!("Bucket '{}' created", self.bucket.name()),
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                    || error_str.contains("already own it")
                {
                    debug!("Bucket '{}' already exists", self.bucket.name());
                } else {
                    warn!(
                        "Could not create bucket '{}': {}. Assuming it exists.",
                        self.bucket.name(),
                        e
                    );
                }
            }
        }
    }

    /// Full object key, e.g. `public/report-photos/{user}/{id}.jpg`
    pub fn photo_key(&self, owner: &str, photo_id: &str) -> String {
        format!("{}/{}", self.public_prefix, photo_path(owner, photo_id))
    }

    pub fn get_file_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_endpoint, self.bucket.name(), key)
    }

    async fn upload(&self, key: &str, data: &[u8], content_type: &str) -> Result<()> {
        let response = self
            .bucket
            .put_object_with_content_type(key, data, content_type)
            .await
            .map_err(|e| {
                tracing::error!("Failed to upload '{}': {:?}", key, e);
                AppError::StoreUnavailable(format!("Failed to upload '{}': {}", key, e))
            })?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(AppError::StoreUnavailable(format!(
                "Upload of '{}' answered with status {}",
                key, status
            )));
        }

        debug!("Uploaded '{}' to bucket '{}'", key, self.bucket.name());
        Ok(())
    }
}

#[async_trait]
impl MediaStore for MinIOClient {
    async fn store(&self, image: CompressedImage, owner: &str) -> Result<PhotoRef> {
        let photo_id = Uuid::now_v7().to_string();
        let key = self.photo_key(owner, &photo_id);

        self.upload(&key, &image.bytes, image.content_type()).await?;

        info!(
            "Stored photo {} for {} ({}x{}, {} bytes)",
            photo_id,
            owner,
            image.width,
            image.height,
            image.byte_len()
        );

        Ok(PhotoRef {
            url: self.get_file_url(&key),
            photo_id,
            key,
        })
    }
}
