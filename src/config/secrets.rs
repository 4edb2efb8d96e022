//! Process-wide secrets.
//!
//! Secrets are read from the environment exactly once at startup and handed
//! to the auth guard and fetchers. They never come from the request body and
//! never appear in `Debug` output.

use std::fmt;

use crate::constants::{ENV_CHATWORK_TOKENS, ENV_INTERNAL_AUTH_TOKEN, ENV_LINE_TOKENS};

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secrets {
    /// Shared secret the caller's `auth_token` is compared against
    pub internal_auth_token: Option<String>,
    /// LINE Messaging API channel access token
    pub line_access_token: Option<String>,
    /// Chatwork API token
    pub chatwork_api_token: Option<String>,
}

impl Secrets {
    /// Read secrets from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read secrets through an arbitrary lookup
    ///
    /// For tokens with two accepted names, the first non-empty one wins.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let first_of = |names: &[&str]| {
            names
                .iter()
                .find_map(|name| lookup(*name).filter(|value| !value.is_empty()))
        };

        Self {
            internal_auth_token: first_of(&[ENV_INTERNAL_AUTH_TOKEN][..]),
            line_access_token: first_of(&ENV_LINE_TOKENS[..]),
            chatwork_api_token: first_of(&ENV_CHATWORK_TOKENS[..]),
        }
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("Secrets")
            .field("internal_auth_token", &redact(&self.internal_auth_token))
            .field("line_access_token", &redact(&self.line_access_token))
            .field("chatwork_api_token", &redact(&self.chatwork_api_token))
            .finish()
    }
}
