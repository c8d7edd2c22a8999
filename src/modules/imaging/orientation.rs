use std::io::Cursor;

use image::DynamicImage;

/// Clockwise rotation requested by EXIF orientation metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    /// Map EXIF tag 0x0112. Only the pure rotations (6, 3, 8) are honoured;
    /// mirrored variants and unknown values leave the image as decoded.
    pub fn from_exif(orientation: u32) -> Self {
        match orientation {
            6 => Rotation::Cw90,
            3 => Rotation::Cw180,
            8 => Rotation::Cw270,
            _ => Rotation::None,
        }
    }

    pub fn apply(self, image: DynamicImage) -> DynamicImage {
        match self {
            Rotation::None => image,
            Rotation::Cw90 => image.rotate90(),
            Rotation::Cw180 => image.rotate180(),
            Rotation::Cw270 => image.rotate270(),
        }
    }
}

/// Read the orientation from the source bytes. Missing or unreadable
/// metadata yields `Rotation::None`.
pub fn read_rotation(bytes: &[u8]) -> Rotation {
    let mut cursor = Cursor::new(bytes);
    let exif = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif,
        Err(e) => {
            tracing::debug!("No usable EXIF orientation: {}", e);
            return Rotation::None;
        }
    };

    exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .map(Rotation::from_exif)
        .unwrap_or(Rotation::None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_pure_rotations_are_mapped() {
        assert_eq!(Rotation::from_exif(1), Rotation::None);
        assert_eq!(Rotation::from_exif(6), Rotation::Cw90);
        assert_eq!(Rotation::from_exif(3), Rotation::Cw180);
        assert_eq!(Rotation::from_exif(8), Rotation::Cw270);
        assert_eq!(Rotation::from_exif(5), Rotation::None);
        assert_eq!(Rotation::from_exif(42), Rotation::None);
    }

    #[test]
    fn test_garbage_bytes_have_no_rotation() {
        assert_eq!(read_rotation(b"not an image"), Rotation::None);
        assert_eq!(read_rotation(&[]), Rotation::None);
    }
}
