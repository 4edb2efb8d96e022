//! LINE Messaging API content fetcher.

use async_trait::async_trait;
use bytes::Bytes;

use super::{build_client, join_url, read_image_body, Provider, SourceFetcher};
use crate::config::LineProviderConfig;
use crate::error::GatewayError;

const CONTEXT: &str = "LINE API Error";

/// Downloads message content with the channel access token
pub struct LineFetcher {
    client: reqwest::Client,
    api_base: String,
    access_token: Option<String>,
    max_body_bytes: usize,
}

impl LineFetcher {
    pub fn new(
        config: &LineProviderConfig,
        access_token: Option<String>,
        max_body_bytes: usize,
    ) -> Result<Self, GatewayError> {
        Ok(Self {
            client: build_client(config.timeout())?,
            api_base: config.api_base.clone(),
            access_token,
            max_body_bytes,
        })
    }

    fn content_url(&self, message_id: &str) -> String {
        join_url(
            &self.api_base,
            &format!("/v2/bot/message/{}/content", urlencoding::encode(message_id)),
        )
    }
}

#[async_trait]
impl SourceFetcher for LineFetcher {
    type Target = str;

    async fn fetch(&self, message_id: &str) -> Result<Bytes, GatewayError> {
        let token = self
            .access_token
            .as_deref()
            .ok_or_else(|| GatewayError::Config("LINE Token not found in Secrets".to_string()))?;

        let response = self
            .client
            .get(self.content_url(message_id))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| GatewayError::upstream_transport(Provider::Line, CONTEXT, e))?;

        read_image_body(response, Provider::Line, CONTEXT, self.max_body_bytes).await
    }
}
