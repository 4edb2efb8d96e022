use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_JPEG_QUALITY, DEFAULT_MAX_DIMENSION, DEFAULT_MAX_PAYLOAD_CHARS,
    DEFAULT_MAX_SOURCE_BYTES, DEFAULT_MAX_SOURCE_PIXELS,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Longest allowed edge after normalization (images are never enlarged)
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,

    /// JPEG quality for the re-encode (1-100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,

    /// Maximum length of the returned data URI in characters
    #[serde(default = "default_max_payload_chars")]
    pub max_payload_chars: usize,

    /// Maximum source pixel count accepted before decoding
    #[serde(default = "default_max_source_pixels")]
    pub max_source_pixels: u64,

    /// Maximum fetched byte length accepted
    #[serde(default = "default_max_source_bytes")]
    pub max_source_bytes: usize,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_MAX_DIMENSION,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            max_payload_chars: DEFAULT_MAX_PAYLOAD_CHARS,
            max_source_pixels: DEFAULT_MAX_SOURCE_PIXELS,
            max_source_bytes: DEFAULT_MAX_SOURCE_BYTES,
        }
    }
}

impl ImageConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_dimension == 0 {
            return Err("image.max_dimension must be greater than 0".to_string());
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(format!(
                "image.jpeg_quality must be between 1 and 100, got {}",
                self.jpeg_quality
            ));
        }
        if self.max_payload_chars == 0 {
            return Err("image.max_payload_chars must be greater than 0".to_string());
        }
        if self.max_source_pixels == 0 || self.max_source_bytes == 0 {
            return Err("image source limits must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn default_max_dimension() -> u32 {
    DEFAULT_MAX_DIMENSION
}

fn default_jpeg_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

fn default_max_payload_chars() -> usize {
    DEFAULT_MAX_PAYLOAD_CHARS
}

fn default_max_source_pixels() -> u64 {
    DEFAULT_MAX_SOURCE_PIXELS
}

fn default_max_source_bytes() -> usize {
    DEFAULT_MAX_SOURCE_BYTES
}
