// Error types module

use thiserror::Error;

use crate::fetcher::Provider;
use crate::image_optimizer::ImageError;

/// Upstream response bodies are cut to this many characters in error messages
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Centralized error type for the gateway pipeline
///
/// Every stage returns this type. The pipeline never distinguishes variants in
/// the response shape; only the display text reaches the caller.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Request token present and different from the configured secret
    #[error("Unauthorized")]
    Unauthorized,

    /// Field required by the selected source is absent
    #[error("Missing {field} for {provider}")]
    MissingParameter {
        provider: Provider,
        field: &'static str,
    },

    /// Server-side secret or setting is absent
    #[error("{0}")]
    Config(String),

    /// Non-success status or transport failure talking to a provider
    #[error("{context}: {detail}")]
    Upstream {
        provider: Provider,
        context: &'static str,
        detail: String,
    },

    /// Fetch succeeded but returned no bytes
    #[error("Image data is empty.")]
    EmptyImage,

    /// Request names no usable source
    #[error("Invalid source or missing image parameters")]
    InvalidSource,

    /// Request body could not be read or parsed
    #[error("Invalid request body: {0}")]
    InvalidRequest(String),

    /// Decode, normalize, encode or size-limit failure
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Unexpected failure inside the gateway (e.g. a panicked worker task)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn missing(provider: Provider, field: &'static str) -> Self {
        GatewayError::MissingParameter { provider, field }
    }

    /// Upstream answered with a non-success status
    pub fn upstream_status(
        provider: Provider,
        context: &'static str,
        status: u16,
        body: &str,
    ) -> Self {
        let body = truncate_body(body);
        let detail = if body.is_empty() {
            format!("HTTP {}", status)
        } else {
            format!("HTTP {} {}", status, body)
        };
        GatewayError::Upstream {
            provider,
            context,
            detail,
        }
    }

    /// Upstream could not be reached or its body could not be read
    pub fn upstream_transport(
        provider: Provider,
        context: &'static str,
        err: impl std::fmt::Display,
    ) -> Self {
        GatewayError::Upstream {
            provider,
            context,
            detail: err.to_string(),
        }
    }

    /// Stable label for metrics and structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Unauthorized => "unauthorized",
            GatewayError::MissingParameter { .. } => "missing_parameter",
            GatewayError::Config(_) => "config_error",
            GatewayError::Upstream { .. } => "upstream_fetch_error",
            GatewayError::EmptyImage => "empty_image",
            GatewayError::InvalidSource => "invalid_source",
            GatewayError::InvalidRequest(_) => "invalid_request",
            GatewayError::Image(e) => e.kind(),
            GatewayError::Internal(_) => "internal",
        }
    }
}

fn truncate_body(body: &str) -> &str {
    let body = body.trim();
    match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
