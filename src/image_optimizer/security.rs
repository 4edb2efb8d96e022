//! Image limit checks
//!
//! Provides:
//! - Source file size limit
//! - Image bomb protection (dimension validation before full decode)
//! - Output payload ceiling on the encoded data URI

use super::error::ImageError;

/// Validate source file size
pub fn validate_file_size(size: usize, max_size: usize) -> Result<(), ImageError> {
    if size > max_size {
        return Err(ImageError::FileTooLarge { size, max_size });
    }
    Ok(())
}

/// Validate image dimensions against the pixel budget
///
/// This should be called BEFORE fully decoding the image to protect
/// against "image bomb" attacks where a small file decompresses to
/// huge dimensions.
pub fn validate_dimensions(width: u32, height: u32, max_pixels: u64) -> Result<(), ImageError> {
    let pixels = width as u64 * height as u64;
    if pixels > max_pixels {
        return Err(ImageError::image_bomb(width, height, max_pixels));
    }
    Ok(())
}

/// Reject a data URI longer than `limit` characters
///
/// Runs after encoding; there is no cheaper estimate of the compressed size.
/// The URI is pure ASCII, so byte length equals character length.
pub fn validate_payload_length(data_uri: &str, limit: usize) -> Result<(), ImageError> {
    let length = data_uri.len();
    if length > limit {
        return Err(ImageError::PayloadTooLarge { length, limit });
    }
    Ok(())
}
