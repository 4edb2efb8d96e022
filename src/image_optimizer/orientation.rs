//! EXIF orientation correction
//!
//! Cameras store pixels in sensor order and record the intended rotation in
//! the EXIF `Orientation` tag. Applying it here bakes the rotation into the
//! pixels, since the JPEG we emit carries no EXIF.

use exif::{In, Reader, Tag};
use image::DynamicImage;
use std::io::Cursor;

/// The eight EXIF orientation values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Normal,
    FlipHorizontal,
    Rotate180,
    FlipVertical,
    /// Mirror across the top-left to bottom-right diagonal
    Transpose,
    Rotate90,
    /// Mirror across the top-right to bottom-left diagonal
    Transverse,
    Rotate270,
}

impl Orientation {
    pub fn from_exif(value: u32) -> Option<Self> {
        match value {
            1 => Some(Orientation::Normal),
            2 => Some(Orientation::FlipHorizontal),
            3 => Some(Orientation::Rotate180),
            4 => Some(Orientation::FlipVertical),
            5 => Some(Orientation::Transpose),
            6 => Some(Orientation::Rotate90),
            7 => Some(Orientation::Transverse),
            8 => Some(Orientation::Rotate270),
            _ => None,
        }
    }

    /// Apply the correction (rotations are clockwise)
    pub fn apply(self, img: DynamicImage) -> DynamicImage {
        match self {
            Orientation::Normal => img,
            Orientation::FlipHorizontal => img.fliph(),
            Orientation::Rotate180 => img.rotate180(),
            Orientation::FlipVertical => img.flipv(),
            Orientation::Transpose => img.rotate90().fliph(),
            Orientation::Rotate90 => img.rotate90(),
            Orientation::Transverse => img.rotate270().fliph(),
            Orientation::Rotate270 => img.rotate270(),
        }
    }
}

/// Read the orientation tag from an encoded image
///
/// `Ok(None)` means the container has no EXIF block or no orientation tag.
pub fn read_orientation(data: &[u8]) -> Result<Option<Orientation>, String> {
    let exif = match Reader::new().read_from_container(&mut Cursor::new(data)) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => return Ok(None),
        Err(e) => return Err(e.to_string()),
    };

    let Some(field) = exif.get_field(Tag::Orientation, In::PRIMARY) else {
        return Ok(None);
    };

    let value = field
        .value
        .get_uint(0)
        .ok_or_else(|| format!("orientation tag has unexpected value {:?}", field.value))?;

    Orientation::from_exif(value)
        .map(Some)
        .ok_or_else(|| format!("orientation value {} out of range", value))
}

/// Best-effort orientation fix
///
/// Any failure to read the tag leaves the image as decoded.
pub fn apply_exif_orientation(img: DynamicImage, data: &[u8]) -> DynamicImage {
    match read_orientation(data) {
        Ok(Some(orientation)) => {
            tracing::debug!(?orientation, "Applying EXIF orientation");
            orientation.apply(img)
        }
        Ok(None) => img,
        Err(e) => {
            tracing::debug!(error = %e, "EXIF orientation unreadable, keeping decoded orientation");
            img
        }
    }
}
