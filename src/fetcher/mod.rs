//! Image source fetchers.
//!
//! Each upstream provider has its own fetcher behind the [`SourceFetcher`]
//! trait. [`Fetchers`] owns one of each and dispatches on a resolved
//! [`ImageSource`]. Fetchers return the raw body and nothing else; format
//! detection happens later, from the bytes.

pub mod chatwork;
pub mod direct;
pub mod line;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use std::fmt;
use std::time::Duration;

use crate::config::{ProvidersConfig, Secrets};
use crate::error::GatewayError;
use crate::image_optimizer::ImageError;
use crate::request::ImageSource;

pub use chatwork::ChatworkFetcher;
pub use direct::DirectUrlFetcher;
pub use line::LineFetcher;

/// Upstream error bodies are read up to this many bytes
const MAX_ERROR_BODY_BYTES: usize = 4096;

/// Upstream image provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Line,
    Chatwork,
    DirectUrl,
}

impl Provider {
    /// Lowercase label used in metrics and logs
    pub fn as_label(&self) -> &'static str {
        match self {
            Provider::Line => "line",
            Provider::Chatwork => "chatwork",
            Provider::DirectUrl => "direct",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Line => write!(f, "LINE"),
            Provider::Chatwork => write!(f, "Chatwork"),
            Provider::DirectUrl => write!(f, "direct URL"),
        }
    }
}

/// Fetches raw image bytes from one provider
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// What the provider needs to locate an image
    type Target: Send + Sync + ?Sized;

    async fn fetch(&self, target: &Self::Target) -> Result<Bytes, GatewayError>;
}

/// One fetcher per provider, built once at startup
pub struct Fetchers {
    line: LineFetcher,
    chatwork: ChatworkFetcher,
    direct: DirectUrlFetcher,
}

impl Fetchers {
    /// Build all fetchers; image bodies longer than `max_body_bytes` are
    /// abandoned mid-download
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Internal` if an HTTP client cannot be created.
    pub fn new(
        config: &ProvidersConfig,
        secrets: &Secrets,
        max_body_bytes: usize,
    ) -> Result<Self, GatewayError> {
        Ok(Self {
            line: LineFetcher::new(
                &config.line,
                secrets.line_access_token.clone(),
                max_body_bytes,
            )?,
            chatwork: ChatworkFetcher::new(
                &config.chatwork,
                secrets.chatwork_api_token.clone(),
                max_body_bytes,
            )?,
            direct: DirectUrlFetcher::new(&config.direct, max_body_bytes)?,
        })
    }

    /// Fetch the bytes for `source` from its provider
    ///
    /// A successful fetch with an empty body is `GatewayError::EmptyImage`.
    pub async fn fetch(&self, source: &ImageSource) -> Result<Bytes, GatewayError> {
        let provider = source.provider();
        let bytes = match source {
            ImageSource::Line { message_id } => self.line.fetch(message_id.as_str()).await?,
            ImageSource::Chatwork(target) => self.chatwork.fetch(target).await?,
            ImageSource::DirectUrl { url } => self.direct.fetch(url.as_str()).await?,
        };

        if bytes.is_empty() {
            return Err(GatewayError::EmptyImage);
        }

        tracing::info!(
            provider = provider.as_label(),
            bytes = bytes.len(),
            "Fetched source image"
        );

        Ok(bytes)
    }
}

/// Build a client, optionally with a whole-request timeout
pub(crate) fn build_client(timeout: Option<Duration>) -> Result<reqwest::Client, GatewayError> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| GatewayError::Internal(format!("Failed to create HTTP client: {}", e)))
}

/// Read a successful response body of at most `max_bytes`, or turn a
/// non-2xx status into an error carrying the status code and body text
///
/// A declared Content-Length over the limit is rejected before any of the
/// body is read; otherwise the body is read chunk by chunk and the download
/// stops as soon as the limit is passed.
pub(crate) async fn read_image_body(
    mut response: reqwest::Response,
    provider: Provider,
    context: &'static str,
    max_bytes: usize,
) -> Result<Bytes, GatewayError> {
    let status = response.status();
    if !status.is_success() {
        let body = read_error_body(response).await;
        return Err(GatewayError::upstream_status(
            provider,
            context,
            status.as_u16(),
            &body,
        ));
    }

    if let Some(length) = response.content_length() {
        if length > max_bytes as u64 {
            return Err(ImageError::FileTooLarge {
                size: usize::try_from(length).unwrap_or(usize::MAX),
                max_size: max_bytes,
            }
            .into());
        }
    }

    let mut body = BytesMut::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| GatewayError::upstream_transport(provider, context, e))?
    {
        let size = body.len() + chunk.len();
        if size > max_bytes {
            tracing::warn!(
                provider = provider.as_label(),
                max_bytes,
                "Abandoned oversized upstream body"
            );
            return Err(ImageError::FileTooLarge {
                size,
                max_size: max_bytes,
            }
            .into());
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body.freeze())
}

/// Read the start of an error response body as text
///
/// Read failures yield whatever arrived before them.
pub(crate) async fn read_error_body(mut response: reqwest::Response) -> String {
    let mut body = BytesMut::new();
    while body.len() < MAX_ERROR_BODY_BYTES {
        match response.chunk().await {
            Ok(Some(chunk)) => body.extend_from_slice(&chunk),
            _ => break,
        }
    }
    body.truncate(MAX_ERROR_BODY_BYTES);
    String::from_utf8_lossy(&body).into_owned()
}

/// Join a configured base URL and a path without doubling the slash
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}
