// Server module - hyper HTTP/1.1 front end for the gateway
//
// Routes:
// - POST (any path): image request, always answered with HTTP 200
// - GET /health: liveness probe
// - GET /metrics: Prometheus text format
// - anything else: 405

use bytes::Bytes;
use http::header::{HeaderValue, ALLOW, CONTENT_TYPE};
use http::{Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::GatewayError;
use crate::metrics;
use crate::pipeline::Gateway;
use crate::request::ImageRequest;
use crate::response::GatewayResponse;

/// Bound listener plus the gateway it serves
pub struct GatewayServer {
    listener: TcpListener,
    gateway: Arc<Gateway>,
    max_body_size: usize,
}

impl GatewayServer {
    pub async fn bind(config: &ServerConfig, gateway: Arc<Gateway>) -> std::io::Result<Self> {
        let listener = TcpListener::bind(config.listen_addr()).await?;
        Ok(Self {
            listener,
            gateway,
            max_body_size: config.max_body_size,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until `shutdown` resolves
    pub async fn run<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()>,
    {
        tracing::info!(address = %self.local_addr()?, "Gateway listening");
        tokio::pin!(shutdown);

        loop {
            let (stream, peer) = tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutdown signal received, no longer accepting connections");
                    return Ok(());
                }
                accepted = self.listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to accept connection");
                        continue;
                    }
                },
            };

            let gateway = Arc::clone(&self.gateway);
            let max_body_size = self.max_body_size;

            tokio::spawn(async move {
                let service = service_fn(move |req| {
                    route(req, Arc::clone(&gateway), max_body_size)
                });

                if let Err(e) = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await
                {
                    tracing::debug!(peer = %peer, error = %e, "Connection closed with error");
                }
            });
        }
    }
}

async fn route(
    req: Request<Incoming>,
    gateway: Arc<Gateway>,
    max_body_size: usize,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let response = match (req.method(), req.uri().path()) {
        (&Method::POST, _) => handle_image_request(req, &gateway, max_body_size).await,
        (&Method::GET, "/health") => json_response(StatusCode::OK, br#"{"status":"healthy"}"#.to_vec()),
        (&Method::GET, "/metrics") => metrics_response(),
        _ => {
            let mut response = json_response(
                StatusCode::METHOD_NOT_ALLOWED,
                br#"{"error":"Method Not Allowed","status":"failed"}"#.to_vec(),
            );
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static("GET, POST"));
            response
        }
    };
    Ok(response)
}

async fn handle_image_request(
    req: Request<Incoming>,
    gateway: &Gateway,
    max_body_size: usize,
) -> Response<Full<Bytes>> {
    let response = match read_request(req, max_body_size).await {
        Ok(request) => gateway.handle(request).await,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected malformed request body");
            GatewayResponse::failure(e)
        }
    };

    match response.to_json() {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize response");
            json_response(
                StatusCode::OK,
                br#"{"error":"Internal error: response serialization failed","status":"failed"}"#
                    .to_vec(),
            )
        }
    }
}

async fn read_request(
    req: Request<Incoming>,
    max_body_size: usize,
) -> Result<ImageRequest, GatewayError> {
    let body = Limited::new(req.into_body(), max_body_size)
        .collect()
        .await
        .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?
        .to_bytes();

    serde_json::from_slice(&body).map_err(|e| GatewayError::InvalidRequest(e.to_string()))
}

fn metrics_response() -> Response<Full<Bytes>> {
    match metrics::encode_text() {
        Ok(text) => {
            let mut response = Response::new(Full::new(Bytes::from(text)));
            response.headers_mut().insert(
                CONTENT_TYPE,
                HeaderValue::from_static("text/plain; version=0.0.4"),
            );
            response
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            let mut response = Response::new(Full::new(Bytes::new()));
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        }
    }
}

fn json_response(status: StatusCode, body: Vec<u8>) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
