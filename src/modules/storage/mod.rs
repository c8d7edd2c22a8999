//! Photo storage
//!
//! `MediaStore` is the seam used by the photo upload flow; `MinIOClient`
//! implements it on top of any S3-compatible service.

mod media_store;
mod minio_client;

pub use media_store::{photo_path, MediaStore, PhotoRef};
pub use minio_client::MinIOClient;
