// Authentication module

use crate::error::GatewayError;

/// Outcome of a token check that did not reject the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthDecision {
    /// Both tokens present and equal
    Verified,
    /// Secret or presented token absent; the request is let through
    Unchecked,
}

/// Shared-secret guard
///
/// A request is rejected only when both the configured secret and the
/// presented token are non-empty and differ. Deployments that need a hard
/// requirement must enforce it in front of the gateway.
#[derive(Clone, Default)]
pub struct AuthGuard {
    secret: Option<String>,
}

impl AuthGuard {
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    pub fn check(&self, presented: Option<&str>) -> Result<AuthDecision, GatewayError> {
        let presented = presented.filter(|t| !t.is_empty());

        match (self.secret.as_deref(), presented) {
            (Some(secret), Some(token)) => {
                if constant_time_compare(secret, token) {
                    Ok(AuthDecision::Verified)
                } else {
                    tracing::warn!("Rejected request with mismatched auth token");
                    Err(GatewayError::Unauthorized)
                }
            }
            _ => Ok(AuthDecision::Unchecked),
        }
    }
}

impl std::fmt::Debug for AuthGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGuard")
            .field("configured", &self.is_configured())
            .finish()
    }
}

/// Constant-time string comparison to prevent timing attacks
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
