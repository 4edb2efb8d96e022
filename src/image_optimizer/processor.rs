//! Image normalization
//!
//! Handles the transformation ahead of encoding:
//! limits → decode → orient → RGB → downscale

use fast_image_resize::{FilterType, Image, PixelType, ResizeAlg, Resizer};
use image::io::Reader as ImageReader;
use image::{DynamicImage, RgbImage};
use std::io::Cursor;
use std::num::NonZeroU32;

use super::config::ImageConfig;
use super::encoder::{EncodedPayload, JpegEncoder};
use super::error::ImageError;
use super::orientation::apply_exif_orientation;
use super::security::{validate_dimensions, validate_file_size, validate_payload_length};

/// Decoded, oriented, three-channel image bounded by `max_dimension`
pub struct NormalizedImage {
    /// RGB pixel buffer
    pub pixels: RgbImage,
    /// Dimensions after orientation, before downscaling (width, height)
    pub original_size: (u32, u32),
}

impl NormalizedImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn was_resized(&self) -> bool {
        self.original_size != (self.width(), self.height())
    }
}

impl std::fmt::Debug for NormalizedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NormalizedImage")
            .field("dimensions", &(self.width(), self.height()))
            .field("original_size", &self.original_size)
            .finish()
    }
}

/// Normalize, encode and size-check fetched bytes
///
/// CPU-bound; async callers should run it on a blocking thread.
pub fn process_image(data: &[u8], config: &ImageConfig) -> Result<EncodedPayload, ImageError> {
    let normalized = normalize_image(data, config)?;
    tracing::debug!(
        original_width = normalized.original_size.0,
        original_height = normalized.original_size.1,
        width = normalized.width(),
        height = normalized.height(),
        resized = normalized.was_resized(),
        "Image normalized"
    );

    let payload = JpegEncoder::with_quality(config.jpeg_quality).encode(&normalized)?;
    validate_payload_length(&payload.data_uri, config.max_payload_chars)?;

    Ok(payload)
}

/// Normalize fetched bytes into a bounded RGB image
///
/// # Errors
/// * `FileTooLarge` / `ImageBombDetected` - source exceeds configured limits
/// * `DecodeFailed` - bytes are not an image the decoder can open
/// * `ResizeFailed` - the downscale could not be performed
pub fn normalize_image(data: &[u8], config: &ImageConfig) -> Result<NormalizedImage, ImageError> {
    validate_file_size(data.len(), config.max_source_bytes)?;

    // 1. Check header dimensions before committing memory to a full decode
    let (header_width, header_height) = read_dimensions(data)?;
    validate_dimensions(header_width, header_height, config.max_source_pixels)?;

    // 2. Decode and apply orientation
    let img = decode_image(data)?;
    let img = apply_exif_orientation(img, data);
    let original_size = (img.width(), img.height());

    // 3. Force three channels; alpha is dropped, palettes and greys expanded
    let rgb = img.into_rgb8();

    // 4. Downscale only
    let (target_width, target_height) =
        fit_within(original_size.0, original_size.1, config.max_dimension);
    let pixels = if (target_width, target_height) != original_size {
        resize_rgb(&rgb, target_width, target_height)?
    } else {
        rgb
    };

    Ok(NormalizedImage {
        pixels,
        original_size,
    })
}

/// Decode image data into a DynamicImage
fn decode_image(data: &[u8]) -> Result<DynamicImage, ImageError> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ImageError::decode_failed(e.to_string()))?
        .decode()
        .map_err(|e| ImageError::decode_failed(e.to_string()))
}

/// Read dimensions from the image header without decoding pixels
fn read_dimensions(data: &[u8]) -> Result<(u32, u32), ImageError> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ImageError::decode_failed(e.to_string()))?
        .into_dimensions()
        .map_err(|e| ImageError::decode_failed(e.to_string()))
}

/// Largest size within `max`x`max` keeping the aspect ratio
///
/// Images that already fit are returned unchanged; nothing is enlarged.
/// The long edge lands exactly on `max` and the short edge is rounded.
pub fn fit_within(width: u32, height: u32, max: u32) -> (u32, u32) {
    if width <= max && height <= max {
        return (width, height);
    }

    let (long, short) = if width >= height {
        (width as u64, height as u64)
    } else {
        (height as u64, width as u64)
    };
    let scaled_short = ((short * max as u64 + long / 2) / long).max(1) as u32;

    if width >= height {
        (max, scaled_short)
    } else {
        (scaled_short, max)
    }
}

/// Resize an RGB image using fast-image-resize with Lanczos3 filter
fn resize_rgb(img: &RgbImage, target_w: u32, target_h: u32) -> Result<RgbImage, ImageError> {
    let src_width = NonZeroU32::new(img.width())
        .ok_or_else(|| ImageError::resize_failed("Source width is 0"))?;
    let src_height = NonZeroU32::new(img.height())
        .ok_or_else(|| ImageError::resize_failed("Source height is 0"))?;
    let dst_width =
        NonZeroU32::new(target_w).ok_or_else(|| ImageError::resize_failed("Target width is 0"))?;
    let dst_height =
        NonZeroU32::new(target_h).ok_or_else(|| ImageError::resize_failed("Target height is 0"))?;

    let src_image = Image::from_vec_u8(
        src_width,
        src_height,
        img.as_raw().clone(),
        PixelType::U8x3,
    )
    .map_err(|e| ImageError::resize_failed(format!("Failed to create source image: {:?}", e)))?;

    let mut dst_image = Image::new(dst_width, dst_height, PixelType::U8x3);

    let mut resizer = Resizer::new(ResizeAlg::Convolution(FilterType::Lanczos3));

    resizer
        .resize(&src_image.view(), &mut dst_image.view_mut())
        .map_err(|e| ImageError::resize_failed(format!("Resize operation failed: {:?}", e)))?;

    RgbImage::from_raw(target_w, target_h, dst_image.into_vec())
        .ok_or_else(|| ImageError::resize_failed("Failed to create output image buffer"))
}
