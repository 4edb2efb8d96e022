// Constants module - centralized default values for configuration
//
// This module defines all default values used throughout the codebase.
// Using constants instead of magic numbers improves maintainability
// and makes it easier to understand and modify defaults.

// =============================================================================
// Server defaults
// =============================================================================

/// Default bind address
pub const DEFAULT_ADDRESS: &str = "0.0.0.0";

/// Default listen port
pub const DEFAULT_PORT: u16 = 8080;

/// Default maximum request body size (1 MB); requests only carry identifiers
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

// =============================================================================
// Provider defaults
// =============================================================================

/// LINE Messaging API content host
pub const DEFAULT_LINE_API_BASE: &str = "https://api-data.line.me";

/// Chatwork REST API host
pub const DEFAULT_CHATWORK_API_BASE: &str = "https://api.chatwork.com";

/// Timeout for direct image URL downloads in seconds
pub const DEFAULT_DIRECT_URL_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Secret names (process environment)
// =============================================================================

/// Shared secret compared against the request's `auth_token`
pub const ENV_INTERNAL_AUTH_TOKEN: &str = "INTERNAL_AUTH_TOKEN";

/// LINE bearer token, primary and fallback names
pub const ENV_LINE_TOKENS: [&str; 2] = ["LINE_ACCESS_TOKEN", "LINE_CHANNEL_ACCESS_TOKEN"];

/// Chatwork API token, primary and fallback names
pub const ENV_CHATWORK_TOKENS: [&str; 2] = ["CHATWORK_API_TOKEN", "X-ChatWorkToken"];

// =============================================================================
// Image defaults
// =============================================================================

/// Longest allowed edge after normalization
pub const DEFAULT_MAX_DIMENSION: u32 = 2048;

/// JPEG quality used for every re-encode
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Ceiling on the data URI length in characters
pub const DEFAULT_MAX_PAYLOAD_CHARS: usize = 3_000_000;

/// Maximum decoded pixel count accepted (100 megapixels)
pub const DEFAULT_MAX_SOURCE_PIXELS: u64 = 100_000_000;

/// Maximum fetched file size accepted (50 MB)
pub const DEFAULT_MAX_SOURCE_BYTES: usize = 50 * 1024 * 1024;

/// Prefix of every successful `base64_image`
pub const JPEG_DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";
