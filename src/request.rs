//! Gateway request and source resolution
//!
//! The wire request is a loose bag of optional fields. It is resolved once,
//! up front, into an [`ImageSource`] so downstream stages only ever see the
//! variant they need.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use crate::error::GatewayError;
use crate::fetcher::Provider;

/// JSON body accepted by the gateway
///
/// Unknown fields (such as the caller's `user`) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ImageRequest {
    #[serde(default)]
    pub auth_token: Option<String>,
    /// `line`, `chatwork`, or anything else to fall back to `image_url`
    #[serde(default)]
    pub source: Option<String>,
    /// LINE message id or Chatwork file id
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    /// Pre-issued Chatwork download URL
    #[serde(default)]
    pub url: Option<String>,
    /// Plain image URL
    #[serde(default)]
    pub image_url: Option<String>,
    /// Chatwork room holding the file, enables the room-scoped lookup
    #[serde(default, deserialize_with = "string_or_number")]
    pub room_id: Option<String>,
}

/// Where the image bytes come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Line { message_id: String },
    Chatwork(ChatworkTarget),
    DirectUrl { url: String },
}

/// How to reach a Chatwork file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatworkTarget {
    /// Download URL already issued by the caller; no API lookup needed
    DownloadUrl(String),
    /// File id to look up through the files API
    File {
        file_id: String,
        room_id: Option<String>,
    },
}

impl ImageSource {
    pub fn provider(&self) -> Provider {
        match self {
            ImageSource::Line { .. } => Provider::Line,
            ImageSource::Chatwork(_) => Provider::Chatwork,
            ImageSource::DirectUrl { .. } => Provider::DirectUrl,
        }
    }
}

impl ImageRequest {
    /// Resolve the request into exactly one source
    ///
    /// A recognized `source` always wins over `image_url`. Empty strings
    /// count as absent.
    pub fn resolve(&self) -> Result<ImageSource, GatewayError> {
        match self.source.as_deref() {
            Some("line") => {
                let message_id = present(&self.id)
                    .ok_or_else(|| GatewayError::missing(Provider::Line, "'id'"))?;
                Ok(ImageSource::Line {
                    message_id: message_id.to_string(),
                })
            }
            Some("chatwork") => {
                let target = if let Some(url) = present(&self.url) {
                    ChatworkTarget::DownloadUrl(url.to_string())
                } else if let Some(file_id) = present(&self.id) {
                    ChatworkTarget::File {
                        file_id: file_id.to_string(),
                        room_id: present(&self.room_id).map(str::to_string),
                    }
                } else {
                    return Err(GatewayError::missing(Provider::Chatwork, "'url' or 'id'"));
                };
                Ok(ImageSource::Chatwork(target))
            }
            _ => match present(&self.image_url) {
                Some(url) => Ok(ImageSource::DirectUrl {
                    url: url.to_string(),
                }),
                None => Err(GatewayError::InvalidSource),
            },
        }
    }

    /// Label for logs and metrics, available before resolution succeeds
    pub fn source_label(&self) -> &'static str {
        match self.source.as_deref() {
            Some("line") => Provider::Line.as_label(),
            Some("chatwork") => Provider::Chatwork.as_label(),
            _ if present(&self.image_url).is_some() => Provider::DirectUrl.as_label(),
            _ => "none",
        }
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}

/// Chatwork file ids are numeric; callers send them as JSON numbers or strings
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}
