//! JPEG re-encoding and data URI construction
//!
//! Every normalized image leaves the gateway as a baseline JPEG at a fixed
//! quality, wrapped in a `data:image/jpeg;base64,` URI.

use base64::{engine::general_purpose::STANDARD, Engine};
use image::codecs::jpeg::JpegEncoder as ImageJpegEncoder;
use image::{ColorType, ImageEncoder as _};
use std::io::Cursor;

use super::error::ImageError;
use super::processor::NormalizedImage;
use crate::constants::{DEFAULT_JPEG_QUALITY, JPEG_DATA_URI_PREFIX};

/// Compressed image plus its data URI
#[derive(Debug, Clone)]
pub struct EncodedPayload {
    /// The JPEG bytes
    pub data: Vec<u8>,
    /// `data:image/jpeg;base64,<base64 of data>`
    pub data_uri: String,
    /// Dimensions of the encoded image (width, height)
    pub dimensions: (u32, u32),
}

impl EncodedPayload {
    /// Compressed size in KiB (reporting only)
    pub fn size_kb(&self) -> f64 {
        self.data.len() as f64 / 1024.0
    }
}

/// JPEG encoder with a fixed quality
#[derive(Debug, Clone, Copy)]
pub struct JpegEncoder {
    quality: u8,
}

impl Default for JpegEncoder {
    fn default() -> Self {
        Self::with_quality(DEFAULT_JPEG_QUALITY)
    }
}

impl JpegEncoder {
    /// Create an encoder; quality is clamped to 1-100
    pub fn with_quality(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    /// Encode raw RGB pixel data (3 bytes per pixel) to JPEG bytes
    pub fn encode_rgb(&self, data: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ImageError> {
        let mut output = Cursor::new(Vec::new());
        let encoder = ImageJpegEncoder::new_with_quality(&mut output, self.quality);

        encoder
            .write_image(data, width, height, ColorType::Rgb8)
            .map_err(|e| ImageError::encode_failed("jpeg", e.to_string()))?;

        Ok(output.into_inner())
    }

    /// Encode a normalized image and wrap it in a data URI
    pub fn encode(&self, image: &NormalizedImage) -> Result<EncodedPayload, ImageError> {
        let data = self.encode_rgb(image.pixels.as_raw(), image.width(), image.height())?;
        let data_uri = to_data_uri(&data);

        Ok(EncodedPayload {
            data,
            data_uri,
            dimensions: (image.width(), image.height()),
        })
    }
}

/// Base64-encode JPEG bytes behind the `data:image/jpeg;base64,` marker
pub fn to_data_uri(jpeg: &[u8]) -> String {
    let mut uri = String::with_capacity(JPEG_DATA_URI_PREFIX.len() + jpeg.len() * 4 / 3 + 4);
    uri.push_str(JPEG_DATA_URI_PREFIX);
    STANDARD.encode_string(jpeg, &mut uri);
    uri
}
