//! Image pipeline error types
//!
//! Covers every failure between "bytes fetched" and "data URI ready":
//! decoding, source limits, resizing, encoding and the payload ceiling.

use std::fmt;

/// Errors that can occur while normalizing and encoding an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    // === Decoding Errors ===
    /// Failed to decode image data
    DecodeFailed { message: String },

    // === Source Limit Errors ===
    /// Image dimensions exceed safety limits (image bomb protection)
    ImageBombDetected {
        width: u32,
        height: u32,
        pixels: u64,
        max_pixels: u64,
    },
    /// Fetched file size exceeds limit
    FileTooLarge { size: usize, max_size: usize },

    // === Processing Errors ===
    /// Resize operation failed
    ResizeFailed { message: String },
    /// Encoding to output format failed
    EncodeFailed { format: String, message: String },

    // === Output Limit Errors ===
    /// Encoded data URI is longer than allowed
    PayloadTooLarge { length: usize, limit: usize },
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageError::DecodeFailed { message } => {
                write!(f, "Failed to decode image: {}", message)
            }
            ImageError::ImageBombDetected {
                width,
                height,
                pixels,
                max_pixels,
            } => {
                write!(
                    f,
                    "Image dimensions {}x{} ({} pixels) exceed limit of {} pixels",
                    width, height, pixels, max_pixels
                )
            }
            ImageError::FileTooLarge { size, max_size } => {
                write!(
                    f,
                    "File size {} bytes exceeds maximum {} bytes",
                    size, max_size
                )
            }
            ImageError::ResizeFailed { message } => {
                write!(f, "Resize failed: {}", message)
            }
            ImageError::EncodeFailed { format, message } => {
                write!(f, "Failed to encode to {}: {}", format, message)
            }
            ImageError::PayloadTooLarge { length, limit } => {
                write!(
                    f,
                    "Payload Too Large: data URI is {} characters, limit is {}",
                    length, limit
                )
            }
        }
    }
}

impl std::error::Error for ImageError {}

impl ImageError {
    /// Stable label used in metrics and logs
    ///
    /// Source-limit violations count as decode errors: the bytes were not
    /// accepted as a usable image.
    pub fn kind(&self) -> &'static str {
        match self {
            ImageError::DecodeFailed { .. }
            | ImageError::ImageBombDetected { .. }
            | ImageError::FileTooLarge { .. } => "decode_error",
            ImageError::ResizeFailed { .. } => "resize_error",
            ImageError::EncodeFailed { .. } => "encode_error",
            ImageError::PayloadTooLarge { .. } => "payload_too_large",
        }
    }

    pub fn decode_failed(message: impl Into<String>) -> Self {
        ImageError::DecodeFailed {
            message: message.into(),
        }
    }

    pub fn resize_failed(message: impl Into<String>) -> Self {
        ImageError::ResizeFailed {
            message: message.into(),
        }
    }

    pub fn encode_failed(format: impl Into<String>, message: impl Into<String>) -> Self {
        ImageError::EncodeFailed {
            format: format.into(),
            message: message.into(),
        }
    }

    pub fn image_bomb(width: u32, height: u32, max_pixels: u64) -> Self {
        ImageError::ImageBombDetected {
            width,
            height,
            pixels: width as u64 * height as u64,
            max_pixels,
        }
    }
}
