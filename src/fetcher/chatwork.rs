//! Chatwork file fetcher.
//!
//! A caller that already holds a download URL skips the API entirely.
//! Otherwise the file id is exchanged for a short-lived `download_url`
//! through the files API, and that URL is fetched without credentials.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;

use super::{
    build_client, join_url, read_error_body, read_image_body, Provider, SourceFetcher,
};
use crate::config::ChatworkProviderConfig;
use crate::error::GatewayError;
use crate::request::ChatworkTarget;

const LINK_CONTEXT: &str = "Chatwork Link Error";
const DOWNLOAD_CONTEXT: &str = "Chatwork Download Error";
const TOKEN_HEADER: &str = "X-ChatWorkToken";

#[derive(Debug, Deserialize)]
struct FileMetadata {
    #[serde(default)]
    download_url: Option<String>,
}

pub struct ChatworkFetcher {
    client: reqwest::Client,
    api_base: String,
    api_token: Option<String>,
    max_body_bytes: usize,
}

impl ChatworkFetcher {
    pub fn new(
        config: &ChatworkProviderConfig,
        api_token: Option<String>,
        max_body_bytes: usize,
    ) -> Result<Self, GatewayError> {
        Ok(Self {
            client: build_client(config.timeout())?,
            api_base: config.api_base.clone(),
            api_token,
            max_body_bytes,
        })
    }

    /// Metadata endpoint; room-scoped when the room is known
    fn metadata_url(&self, file_id: &str, room_id: Option<&str>) -> String {
        let file_id = urlencoding::encode(file_id);
        let path = match room_id {
            Some(room_id) => format!(
                "/v2/rooms/{}/files/{}?create_download_url=1",
                urlencoding::encode(room_id),
                file_id
            ),
            None => format!("/v2/files/{}", file_id),
        };
        join_url(&self.api_base, &path)
    }

    async fn resolve_download_url(
        &self,
        file_id: &str,
        room_id: Option<&str>,
    ) -> Result<String, GatewayError> {
        let token = self.api_token.as_deref().ok_or_else(|| {
            GatewayError::Config("Chatwork Token not found in Secrets".to_string())
        })?;

        let response = self
            .client
            .get(self.metadata_url(file_id, room_id))
            .header(TOKEN_HEADER, token)
            .send()
            .await
            .map_err(|e| GatewayError::upstream_transport(Provider::Chatwork, LINK_CONTEXT, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = read_error_body(response).await;
            return Err(GatewayError::upstream_status(
                Provider::Chatwork,
                LINK_CONTEXT,
                status.as_u16(),
                &body,
            ));
        }

        let metadata: FileMetadata = response
            .json()
            .await
            .map_err(|e| GatewayError::upstream_transport(Provider::Chatwork, LINK_CONTEXT, e))?;

        metadata
            .download_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                GatewayError::upstream_transport(
                    Provider::Chatwork,
                    LINK_CONTEXT,
                    "response has no 'download_url'",
                )
            })
    }
}

#[async_trait]
impl SourceFetcher for ChatworkFetcher {
    type Target = ChatworkTarget;

    async fn fetch(&self, target: &ChatworkTarget) -> Result<Bytes, GatewayError> {
        let download_url = match target {
            ChatworkTarget::DownloadUrl(url) => url.clone(),
            ChatworkTarget::File { file_id, room_id } => {
                self.resolve_download_url(file_id, room_id.as_deref())
                    .await?
            }
        };

        tracing::debug!(provider = "chatwork", "Downloading Chatwork file");

        let response = self.client.get(&download_url).send().await.map_err(|e| {
            GatewayError::upstream_transport(Provider::Chatwork, DOWNLOAD_CONTEXT, e)
        })?;

        read_image_body(
            response,
            Provider::Chatwork,
            DOWNLOAD_CONTEXT,
            self.max_body_bytes,
        )
        .await
    }
}
