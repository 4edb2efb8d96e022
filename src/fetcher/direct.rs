//! Plain HTTP(S) download of a caller-supplied URL.

use async_trait::async_trait;
use bytes::Bytes;

use super::{build_client, read_image_body, Provider, SourceFetcher};
use crate::config::DirectUrlConfig;
use crate::error::GatewayError;

const CONTEXT: &str = "Failed to download image";

pub struct DirectUrlFetcher {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl DirectUrlFetcher {
    pub fn new(config: &DirectUrlConfig, max_body_bytes: usize) -> Result<Self, GatewayError> {
        Ok(Self {
            client: build_client(Some(config.timeout()))?,
            max_body_bytes,
        })
    }
}

#[async_trait]
impl SourceFetcher for DirectUrlFetcher {
    type Target = str;

    async fn fetch(&self, url: &str) -> Result<Bytes, GatewayError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| GatewayError::upstream_transport(Provider::DirectUrl, CONTEXT, e))?;

        read_image_body(response, Provider::DirectUrl, CONTEXT, self.max_body_bytes).await
    }
}
