// Request pipeline: auth -> resolve -> fetch -> normalize/encode -> size guard

use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::auth::AuthGuard;
use crate::config::{Config, Secrets};
use crate::error::GatewayError;
use crate::fetcher::Fetchers;
use crate::image_optimizer::{process_image, EncodedPayload, ImageConfig};
use crate::metrics::GatewayMetrics;
use crate::request::ImageRequest;
use crate::response::GatewayResponse;

/// The image gateway
///
/// Holds everything built once at startup; cheap to share behind an `Arc`.
pub struct Gateway {
    auth: AuthGuard,
    fetchers: Fetchers,
    image: ImageConfig,
}

impl Gateway {
    /// # Errors
    ///
    /// Fails only if an HTTP client cannot be constructed.
    pub fn new(config: &Config, secrets: Secrets) -> Result<Self, GatewayError> {
        let fetchers = Fetchers::new(&config.providers, &secrets, config.image.max_source_bytes)?;
        Ok(Self {
            auth: AuthGuard::new(secrets.internal_auth_token),
            fetchers,
            image: config.image.clone(),
        })
    }

    /// Handle one request and build the response
    ///
    /// Never fails: every error becomes the failure shape.
    pub async fn handle(&self, request: ImageRequest) -> GatewayResponse {
        let request_id = Uuid::new_v4();
        let source = request.source_label();
        let span = tracing::info_span!("image_request", %request_id, source);

        async move {
            let started = Instant::now();
            let result = self.process(&request).await;
            let elapsed = started.elapsed().as_secs_f64();

            GatewayMetrics::global().record_request(
                source,
                result.as_ref().map(|payload| payload.data.len()),
                elapsed,
            );

            match &result {
                Ok(payload) => tracing::info!(
                    size_kb = payload.size_kb(),
                    width = payload.dimensions.0,
                    height = payload.dimensions.1,
                    elapsed_ms = (elapsed * 1000.0) as u64,
                    "Image processed"
                ),
                Err(e) => tracing::warn!(
                    error_kind = e.kind(),
                    error = %e,
                    elapsed_ms = (elapsed * 1000.0) as u64,
                    "Image request failed"
                ),
            }

            GatewayResponse::from_result(result)
        }
        .instrument(span)
        .await
    }

    /// Run the stages, short-circuiting on the first error
    pub async fn process(&self, request: &ImageRequest) -> Result<EncodedPayload, GatewayError> {
        self.auth.check(request.auth_token.as_deref())?;

        let source = request.resolve()?;
        let bytes = self.fetchers.fetch(&source).await?;

        let image_config = self.image.clone();
        let payload = tokio::task::spawn_blocking(move || process_image(&bytes, &image_config))
            .await
            .map_err(|e| GatewayError::Internal(format!("image worker failed: {}", e)))??;

        Ok(payload)
    }
}
