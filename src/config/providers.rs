//! Upstream provider configuration.
//!
//! Base URLs exist so deployments (and tests) can point at mirrors; the
//! defaults are the public LINE and Chatwork hosts. Provider timeouts are
//! unset by default, which leaves the HTTP client's own behaviour in place.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{
    DEFAULT_CHATWORK_API_BASE, DEFAULT_DIRECT_URL_TIMEOUT_SECS, DEFAULT_LINE_API_BASE,
};

fn default_line_api_base() -> String {
    DEFAULT_LINE_API_BASE.to_string()
}

fn default_chatwork_api_base() -> String {
    DEFAULT_CHATWORK_API_BASE.to_string()
}

fn default_direct_timeout() -> u64 {
    DEFAULT_DIRECT_URL_TIMEOUT_SECS
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub line: LineProviderConfig,
    #[serde(default)]
    pub chatwork: ChatworkProviderConfig,
    #[serde(default)]
    pub direct: DirectUrlConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineProviderConfig {
    #[serde(default = "default_line_api_base")]
    pub api_base: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for LineProviderConfig {
    fn default() -> Self {
        Self {
            api_base: default_line_api_base(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatworkProviderConfig {
    #[serde(default = "default_chatwork_api_base")]
    pub api_base: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for ChatworkProviderConfig {
    fn default() -> Self {
        Self {
            api_base: default_chatwork_api_base(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectUrlConfig {
    /// Whole-request timeout for direct downloads (default: 30s)
    #[serde(default = "default_direct_timeout")]
    pub timeout_secs: u64,
}

impl Default for DirectUrlConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_direct_timeout(),
        }
    }
}

impl LineProviderConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl ChatworkProviderConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl DirectUrlConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ProvidersConfig {
    pub fn validate(&self) -> Result<(), String> {
        for (name, base) in [
            ("providers.line.api_base", &self.line.api_base),
            ("providers.chatwork.api_base", &self.chatwork.api_base),
        ] {
            if !(base.starts_with("http://") || base.starts_with("https://")) {
                return Err(format!(
                    "{} must be an http(s) URL, got '{}'",
                    name, base
                ));
            }
        }

        let zero_timeout = self.line.timeout_secs == Some(0)
            || self.chatwork.timeout_secs == Some(0)
            || self.direct.timeout_secs == 0;
        if zero_timeout {
            return Err("provider timeouts must be greater than 0".to_string());
        }

        Ok(())
    }
}
