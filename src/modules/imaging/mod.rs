pub mod orientation;
pub mod pipeline;

pub use pipeline::{compress, CompressedImage, ImageError, ImageOptions, ImagePipeline};
