use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageFormat, ImageReader, Limits, RgbImage};
use jpeg_decoder::PixelFormat;
use thiserror::Error;

use super::orientation::{read_rotation, Rotation};
use crate::core::config::ImageConfig;

pub const DEFAULT_MAX_WIDTH: u32 = 1024;
pub const DEFAULT_MAX_HEIGHT: u32 = 1024;
pub const DEFAULT_QUALITY: u8 = 80;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("cannot decode source image: {0}")]
    Decode(String),

    #[error("cannot encode compressed image: {0}")]
    Encode(String),

    #[error("invalid compression options: {0}")]
    InvalidOptions(String),
}

/// JPEG output of the pipeline, owned by whoever asked for it
#[derive(Debug, Clone)]
pub struct CompressedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl CompressedImage {
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    pub fn content_type(&self) -> &'static str {
        "image/jpeg"
    }
}

#[derive(Debug, Clone)]
pub struct ImageOptions {
    pub max_width: u32,
    pub max_height: u32,
    /// 0-100
    pub quality: u8,
    /// Cap on decoder allocations; `None` keeps the `image` crate default
    pub max_decode_alloc: Option<u64>,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
            quality: DEFAULT_QUALITY,
            max_decode_alloc: None,
        }
    }
}

impl From<&ImageConfig> for ImageOptions {
    fn from(config: &ImageConfig) -> Self {
        Self {
            max_width: config.max_width,
            max_height: config.max_height,
            quality: config.quality,
            max_decode_alloc: Some(config.max_decode_alloc),
        }
    }
}

impl ImageOptions {
    fn validate(&self) -> Result<(), ImageError> {
        if self.max_width == 0 || self.max_height == 0 {
            return Err(ImageError::InvalidOptions(
                "max width and height must be positive".to_string(),
            ));
        }
        if self.quality > 100 {
            return Err(ImageError::InvalidOptions(format!(
                "quality must be between 0 and 100, got {}",
                self.quality
            )));
        }
        Ok(())
    }
}

/// Compress with explicit bounds and quality.
pub fn compress(
    source: &[u8],
    max_width: u32,
    max_height: u32,
    quality: u8,
) -> Result<CompressedImage, ImageError> {
    ImagePipeline::new(ImageOptions {
        max_width,
        max_height,
        quality,
        max_decode_alloc: None,
    })
    .compress(source)
}

/// Power-of-two reduction applied while decoding. Starting at 1, the
/// factor doubles while `ceil(h/2)/s >= max_height` and
/// `ceil(w/2)/s >= max_width`, so the reduced image never drops below the
/// bounds.
pub fn downsample_factor(width: u32, height: u32, max_width: u32, max_height: u32) -> u32 {
    let mut factor: u32 = 1;
    if width <= max_width && height <= max_height {
        return factor;
    }

    let half_width = width.div_ceil(2);
    let half_height = height.div_ceil(2);
    while half_height / factor >= max_height && half_width / factor >= max_width {
        match factor.checked_mul(2) {
            Some(next) => factor = next,
            None => break,
        }
    }
    factor
}

/// Uniform scale that fits `width`x`height` inside the bounds. Never upscales.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width <= max_width && height <= max_height {
        return (width, height);
    }

    let ratio = f64::min(
        f64::from(max_width) / f64::from(width),
        f64::from(max_height) / f64::from(height),
    );
    let scaled_width = ((f64::from(width) * ratio).round() as u32).clamp(1, max_width);
    let scaled_height = ((f64::from(height) * ratio).round() as u32).clamp(1, max_height);
    (scaled_width, scaled_height)
}

/// Photo compression: probe, downsample, orient, fit, encode.
///
/// Every intermediate buffer is a local owned by one call and is dropped
/// before the call returns, whether it succeeds or fails.
#[derive(Debug, Clone, Default)]
pub struct ImagePipeline {
    options: ImageOptions,
}

impl ImagePipeline {
    pub fn new(options: ImageOptions) -> Self {
        Self { options }
    }

    pub fn compress(&self, source: &[u8]) -> Result<CompressedImage, ImageError> {
        self.options.validate()?;
        let ImageOptions {
            max_width,
            max_height,
            quality,
            ..
        } = self.options;

        let (source_width, source_height) = self.probe_dimensions(source)?;
        let factor = downsample_factor(source_width, source_height, max_width, max_height);
        let is_jpeg = matches!(image::guess_format(source), Ok(ImageFormat::Jpeg));

        let decoded = if is_jpeg {
            self.decode_jpeg_scaled(source, factor)?
        } else {
            self.decode(source)?
        };

        // Whatever the decoder could not reduce natively is finished here
        let sampled = if decoded.width() > source_width.div_ceil(factor)
            || decoded.height() > source_height.div_ceil(factor)
        {
            let width = (source_width / factor).max(1);
            let height = (source_height / factor).max(1);
            let reduced = decoded.thumbnail_exact(width, height);
            drop(decoded);
            reduced
        } else {
            decoded
        };

        let rotation = read_rotation(source);
        let oriented = rotation.apply(sampled);

        let (target_width, target_height) =
            fit_within(oriented.width(), oriented.height(), max_width, max_height);
        let resized = (target_width, target_height) != (oriented.width(), oriented.height());
        let fitted = if resized {
            oriented.resize_exact(target_width, target_height, FilterType::Lanczos3)
        } else {
            oriented
        };

        let rgb = fitted.into_rgb8();
        let mut compressed = encode_jpeg(&rgb, quality)?;

        let untouched = factor == 1 && rotation == Rotation::None && !resized;
        if untouched && compressed.byte_len() >= source.len() {
            if is_jpeg {
                compressed.bytes = source.to_vec();
            } else {
                compressed = encode_jpeg_below(&rgb, quality, source.len())?;
            }
        }
        drop(rgb);

        tracing::debug!(
            source_width,
            source_height,
            factor,
            width = compressed.width,
            height = compressed.height,
            source_bytes = source.len(),
            output_bytes = compressed.byte_len(),
            "Compressed image"
        );

        Ok(compressed)
    }

    fn reader<'a>(&self, source: &'a [u8]) -> Result<ImageReader<Cursor<&'a [u8]>>, ImageError> {
        let reader = ImageReader::new(Cursor::new(source))
            .with_guessed_format()
            .map_err(|e| ImageError::Decode(e.to_string()))?;

        if reader.format().is_none() {
            return Err(ImageError::Decode("unrecognized image format".to_string()));
        }
        Ok(reader)
    }

    /// Header-only read; no pixel buffer is allocated.
    fn probe_dimensions(&self, source: &[u8]) -> Result<(u32, u32), ImageError> {
        let (width, height) = self
            .reader(source)?
            .into_dimensions()
            .map_err(|e| ImageError::Decode(e.to_string()))?;

        if width == 0 || height == 0 {
            return Err(ImageError::Decode("image has no pixels".to_string()));
        }
        Ok((width, height))
    }

    /// Full-size decode through `image`, used for PNG and WebP sources.
    fn decode(&self, source: &[u8]) -> Result<DynamicImage, ImageError> {
        let mut reader = self.reader(source)?;
        if let Some(max_alloc) = self.options.max_decode_alloc {
            let mut limits = Limits::default();
            limits.max_alloc = Some(max_alloc);
            reader.limits(limits);
        }

        reader
            .decode()
            .map_err(|e| ImageError::Decode(e.to_string()))
    }

    /// JPEG decode scaled by 1/2, 1/4 or 1/8 inside the IDCT, so the full
    /// size pixel buffer is never allocated.
    fn decode_jpeg_scaled(&self, source: &[u8], factor: u32) -> Result<DynamicImage, ImageError> {
        let mut decoder = jpeg_decoder::Decoder::new(Cursor::new(source));
        decoder
            .read_info()
            .map_err(|e| ImageError::Decode(e.to_string()))?;
        let info = decoder
            .info()
            .ok_or_else(|| ImageError::Decode("missing JPEG frame header".to_string()))?;

        let channels: u64 = match info.pixel_format {
            PixelFormat::L8 => 1,
            PixelFormat::RGB24 => 3,
            PixelFormat::CMYK32 => 4,
            // 16-bit lossless frames cannot be scaled by the decoder
            _ => return self.decode(source),
        };

        let native = factor.min(8) as u16;
        let (width, height) = if native > 1 {
            decoder
                .scale(info.width.div_ceil(native), info.height.div_ceil(native))
                .map_err(|e| ImageError::Decode(e.to_string()))?
        } else {
            (info.width, info.height)
        };

        if let Some(max_alloc) = self.options.max_decode_alloc {
            let needed = u64::from(width) * u64::from(height) * channels;
            if needed > max_alloc {
                return Err(ImageError::Decode(format!(
                    "decoding needs {} bytes, limit is {}",
                    needed, max_alloc
                )));
            }
        }

        let pixels = decoder
            .decode()
            .map_err(|e| ImageError::Decode(e.to_string()))?;
        let (width, height) = (u32::from(width), u32::from(height));

        let image = match info.pixel_format {
            PixelFormat::L8 => GrayImage::from_raw(width, height, pixels).map(DynamicImage::ImageLuma8),
            PixelFormat::CMYK32 => {
                RgbImage::from_raw(width, height, cmyk_to_rgb(&pixels)).map(DynamicImage::ImageRgb8)
            }
            _ => RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8),
        };
        image.ok_or_else(|| {
            ImageError::Decode("decoded pixels do not match the frame size".to_string())
        })
    }
}

fn cmyk_to_rgb(cmyk: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(cmyk.len() / 4 * 3);
    for pixel in cmyk.chunks_exact(4) {
        let k = 255 - u16::from(pixel[3]);
        for &channel in &pixel[..3] {
            rgb.push(((255 - u16::from(channel)) * k / 255) as u8);
        }
    }
    rgb
}

fn encode_jpeg(rgb: &RgbImage, quality: u8) -> Result<CompressedImage, ImageError> {
    let (width, height) = rgb.dimensions();

    let mut bytes = Vec::new();
    // The encoder's lowest setting is 1
    let mut encoder = JpegEncoder::new_with_quality(&mut bytes, quality.max(1));
    encoder
        .encode_image(rgb)
        .map_err(|e| ImageError::Encode(e.to_string()))?;

    Ok(CompressedImage {
        bytes,
        width,
        height,
    })
}

/// Halve the quality until the encoding is smaller than `limit` bytes.
/// Quality 1 is the last attempt.
fn encode_jpeg_below(
    rgb: &RgbImage,
    quality: u8,
    limit: usize,
) -> Result<CompressedImage, ImageError> {
    let mut quality = (quality / 2).max(1);
    loop {
        let attempt = encode_jpeg(rgb, quality)?;
        if attempt.byte_len() < limit || quality == 1 {
            return Ok(attempt);
        }
        quality = (quality / 2).max(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn sample_image(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            let checker = if (x / 4 + y / 4) % 2 == 0 { 40 } else { 0 };
            Rgb([
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                (128 + checker) as u8,
            ])
        })
    }

    fn encode_as(image: &RgbImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    fn jpeg_at_quality(image: &RgbImage, quality: u8) -> Vec<u8> {
        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, quality)
            .encode_image(image)
            .unwrap();
        bytes
    }

    /// Splice a minimal big-endian EXIF APP1 segment carrying only the
    /// orientation tag right after the JPEG SOI marker.
    fn with_exif_orientation(jpeg: &[u8], orientation: u16) -> Vec<u8> {
        let mut tiff = vec![
            b'M', b'M', 0x00, 0x2A, // big-endian TIFF header
            0x00, 0x00, 0x00, 0x08, // offset of IFD0
            0x00, 0x01, // one entry
            0x01, 0x12, // tag: Orientation
            0x00, 0x03, // type: SHORT
            0x00, 0x00, 0x00, 0x01, // count
        ];
        tiff.extend_from_slice(&orientation.to_be_bytes());
        tiff.extend_from_slice(&[0x00, 0x00]); // value padding
        tiff.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // no next IFD

        let mut payload = b"Exif\0\0".to_vec();
        payload.extend_from_slice(&tiff);
        let segment_len = (payload.len() + 2) as u16;

        let mut out = Vec::with_capacity(jpeg.len() + payload.len() + 4);
        out.extend_from_slice(&jpeg[..2]);
        out.extend_from_slice(&[0xFF, 0xE1]);
        out.extend_from_slice(&segment_len.to_be_bytes());
        out.extend_from_slice(&payload);
        out.extend_from_slice(&jpeg[2..]);
        out
    }

    #[test]
    fn test_downsample_factor() {
        assert_eq!(downsample_factor(800, 600, 1024, 1024), 1);
        assert_eq!(downsample_factor(3000, 2000, 1024, 1024), 1);
        assert_eq!(downsample_factor(4096, 4096, 1024, 1024), 4);
        assert_eq!(downsample_factor(8192, 6144, 1024, 1024), 4);
        assert_eq!(downsample_factor(10000, 10000, 1024, 1024), 8);
        assert_eq!(downsample_factor(400, 200, 100, 100), 2);
        // Both axes must satisfy the bound
        assert_eq!(downsample_factor(16384, 1000, 1024, 1024), 1);
    }

    #[test]
    fn test_fit_within_preserves_aspect_and_never_upscales() {
        assert_eq!(fit_within(3000, 2000, 1024, 1024), (1024, 683));
        assert_eq!(fit_within(2000, 3000, 1024, 1024), (683, 1024));
        assert_eq!(fit_within(500, 300, 1024, 1024), (500, 300));
        assert_eq!(fit_within(1024, 1024, 1024, 1024), (1024, 1024));
    }

    #[test]
    fn test_in_bounds_image_keeps_size_and_shrinks() {
        let source = jpeg_at_quality(&sample_image(64, 48), 100);

        let out = compress(&source, DEFAULT_MAX_WIDTH, DEFAULT_MAX_HEIGHT, 80).unwrap();

        assert_eq!((out.width, out.height), (64, 48));
        assert!(out.byte_len() <= source.len());
        assert_eq!(&out.bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_in_bounds_low_quality_jpeg_is_never_grown() {
        let source = jpeg_at_quality(&sample_image(256, 192), 30);

        let out = compress(&source, DEFAULT_MAX_WIDTH, DEFAULT_MAX_HEIGHT, 80).unwrap();

        assert_eq!((out.width, out.height), (256, 192));
        assert!(out.byte_len() <= source.len());
        assert_eq!(out.bytes, source);
    }

    #[test]
    fn test_in_bounds_png_output_is_not_larger() {
        let source = encode_as(&sample_image(96, 64), ImageFormat::Png);

        let out = compress(&source, DEFAULT_MAX_WIDTH, DEFAULT_MAX_HEIGHT, 95).unwrap();

        assert_eq!((out.width, out.height), (96, 64));
        assert!(out.byte_len() <= source.len());
        assert_eq!(&out.bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_large_jpeg_is_reduced_during_decode() {
        let source = jpeg_at_quality(&sample_image(2048, 2048), 85);
        assert_eq!(downsample_factor(2048, 2048, 512, 512), 4);

        // A full-size decode needs 12 MiB; the 1/4 scaled one needs 768 KiB
        let pipeline = ImagePipeline::new(ImageOptions {
            max_width: 512,
            max_height: 512,
            quality: 80,
            max_decode_alloc: Some(4 * 1024 * 1024),
        });
        let out = pipeline.compress(&source).unwrap();

        assert_eq!((out.width, out.height), (512, 512));
    }

    #[test]
    fn test_jpeg_decode_limit_applies_to_scaled_size() {
        let source = jpeg_at_quality(&sample_image(512, 512), 85);
        let pipeline = ImagePipeline::new(ImageOptions {
            max_width: 128,
            max_height: 128,
            quality: 80,
            max_decode_alloc: Some(1024),
        });
        assert!(matches!(pipeline.compress(&source), Err(ImageError::Decode(_))));
    }

    #[test]
    fn test_oversized_image_is_scaled_into_bounds() {
        let source = encode_as(&sample_image(400, 200), ImageFormat::Png);

        let out = compress(&source, 100, 100, 80).unwrap();

        assert_eq!((out.width, out.height), (100, 50));
    }

    #[test]
    fn test_downsampled_image_still_meets_bounds() {
        let source = encode_as(&sample_image(900, 600), ImageFormat::Png);

        // Factor 8 reduces to 112x75 before the final fit
        assert_eq!(downsample_factor(900, 600, 100, 60), 8);
        let out = compress(&source, 100, 60, 70).unwrap();

        assert_eq!((out.width, out.height), (90, 60));
    }

    #[test]
    fn test_exif_rotation_is_applied() {
        let plain = jpeg_at_quality(&sample_image(40, 20), 90);
        let rotated_source = with_exif_orientation(&plain, 6);

        let out = compress(&rotated_source, DEFAULT_MAX_WIDTH, DEFAULT_MAX_HEIGHT, 80).unwrap();
        assert_eq!((out.width, out.height), (20, 40));

        let upside_down = with_exif_orientation(&plain, 3);
        let out = compress(&upside_down, DEFAULT_MAX_WIDTH, DEFAULT_MAX_HEIGHT, 80).unwrap();
        assert_eq!((out.width, out.height), (40, 20));

        let counter_clockwise = with_exif_orientation(&plain, 8);
        let out =
            compress(&counter_clockwise, DEFAULT_MAX_WIDTH, DEFAULT_MAX_HEIGHT, 80).unwrap();
        assert_eq!((out.width, out.height), (20, 40));
    }

    #[test]
    fn test_unreadable_source_is_decode_error() {
        let err = compress(b"definitely not an image", 1024, 1024, 80).unwrap_err();
        assert!(matches!(err, ImageError::Decode(_)));

        let truncated = &jpeg_at_quality(&sample_image(32, 32), 90)[..20];
        assert!(matches!(
            compress(truncated, 1024, 1024, 80),
            Err(ImageError::Decode(_))
        ));
    }

    #[test]
    fn test_invalid_options_are_rejected() {
        let source = jpeg_at_quality(&sample_image(8, 8), 90);
        assert!(matches!(
            compress(&source, 1024, 1024, 101),
            Err(ImageError::InvalidOptions(_))
        ));
        assert!(matches!(
            compress(&source, 0, 1024, 80),
            Err(ImageError::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_quality_zero_is_accepted() {
        let source = jpeg_at_quality(&sample_image(16, 16), 90);
        let out = compress(&source, 1024, 1024, 0).unwrap();
        assert_eq!((out.width, out.height), (16, 16));
    }

    #[test]
    fn test_decode_limit_is_enforced() {
        let source = encode_as(&sample_image(256, 256), ImageFormat::Png);
        let pipeline = ImagePipeline::new(ImageOptions {
            max_decode_alloc: Some(1024),
            ..ImageOptions::default()
        });
        assert!(matches!(pipeline.compress(&source), Err(ImageError::Decode(_))));
    }
}
