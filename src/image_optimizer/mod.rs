//! Image normalization and encoding
//!
//! Turns fetched bytes into the gateway's single output form:
//! - Decode any format the `image` crate was built with
//! - Apply EXIF orientation (best effort)
//! - Convert to RGB and downscale to fit `max_dimension`
//! - Re-encode as JPEG and wrap in a base64 data URI
//! - Enforce the data URI length ceiling

pub mod config;
pub mod encoder;
pub mod error;
pub mod orientation;
pub mod processor;
pub mod security;

// Re-export commonly used types
pub use config::ImageConfig;
pub use encoder::{to_data_uri, EncodedPayload, JpegEncoder};
pub use error::ImageError;
pub use orientation::{apply_exif_orientation, read_orientation, Orientation};
pub use processor::{fit_within, normalize_image, process_image, NormalizedImage};
pub use security::{validate_dimensions, validate_file_size, validate_payload_length};
