// Gateway Prometheus metrics
//
// - Request counters by source and outcome
// - Request latency histogram by source
// - Compressed payload size histogram
// - Upstream failure counters by provider

use prometheus::{
    register_histogram, register_histogram_vec, register_int_counter_vec, Encoder, Histogram,
    HistogramVec, IntCounterVec, TextEncoder,
};
use std::sync::OnceLock;

use crate::error::GatewayError;

/// Global metrics registry for the gateway
pub struct GatewayMetrics {
    /// Requests handled, by `source` and `status` (success/failed)
    pub requests: IntCounterVec,

    /// End-to-end request duration in seconds, by `source`
    pub request_duration: HistogramVec,

    /// Compressed JPEG size in bytes for successful requests
    pub payload_bytes: Histogram,

    /// Upstream fetch failures by `provider`
    pub upstream_errors: IntCounterVec,
}

static METRICS: OnceLock<GatewayMetrics> = OnceLock::new();

impl GatewayMetrics {
    /// Initialize and return the global metrics instance
    ///
    /// Subsequent calls return the same instance.
    pub fn global() -> &'static Self {
        METRICS.get_or_init(|| {
            let requests = register_int_counter_vec!(
                "hato_requests_total",
                "Total number of image requests by source and outcome",
                &["source", "status"]
            )
            .expect("Failed to register hato_requests_total metric");

            let request_duration = register_histogram_vec!(
                "hato_request_duration_seconds",
                "End-to-end image request duration in seconds",
                &["source"],
                vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]  // 50ms to 30s
            )
            .expect("Failed to register hato_request_duration_seconds metric");

            let payload_bytes = register_histogram!(
                "hato_payload_bytes",
                "Compressed JPEG payload size in bytes",
                vec![16_384.0, 65_536.0, 262_144.0, 524_288.0, 1_048_576.0, 2_097_152.0]  // 16KiB to 2MiB
            )
            .expect("Failed to register hato_payload_bytes metric");

            let upstream_errors = register_int_counter_vec!(
                "hato_upstream_errors_total",
                "Total number of upstream fetch failures by provider",
                &["provider"]
            )
            .expect("Failed to register hato_upstream_errors_total metric");

            GatewayMetrics {
                requests,
                request_duration,
                payload_bytes,
                upstream_errors,
            }
        })
    }

    /// Record one finished request
    pub fn record_request(
        &self,
        source: &str,
        result: Result<usize, &GatewayError>,
        duration_secs: f64,
    ) {
        let status = if result.is_ok() { "success" } else { "failed" };
        self.requests.with_label_values(&[source, status]).inc();
        self.request_duration
            .with_label_values(&[source])
            .observe(duration_secs);

        match result {
            Ok(bytes) => self.payload_bytes.observe(bytes as f64),
            Err(GatewayError::Upstream { provider, .. }) => {
                self.upstream_errors
                    .with_label_values(&[provider.as_label()])
                    .inc();
            }
            Err(_) => {}
        }
    }
}

/// Render every registered metric in the Prometheus text format
pub fn encode_text() -> Result<String, prometheus::Error> {
    // Make sure gateway metrics exist even before the first request
    GatewayMetrics::global();

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&prometheus::gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
