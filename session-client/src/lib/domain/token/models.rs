use std::fmt;

use auth::Claims;
use auth::JwtHandler;
use serde::Deserialize;
use serde::Serialize;

/// Access and refresh token pair issued by the Auth API.
///
/// Both tokens are opaque to everything except the identity codec and the
/// expiry check.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    #[serde(alias = "token")]
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds, when the issuer reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

impl TokenPair {
    /// Construct a token pair without a reported lifetime.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expires_in: None,
        }
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Check whether a token is expired at `now` (Unix seconds).
///
/// Fails closed: a token that cannot be decoded, or that carries no `exp`
/// claim, is expired.
pub fn is_expired_at(token: &str, now: i64) -> bool {
    match JwtHandler::inspector().decode_unverified::<Claims>(token) {
        Ok(claims) => claims.exp.is_none() || claims.is_expired(now),
        Err(e) => {
            tracing::debug!(error = %e, "Unreadable token treated as expired");
            true
        }
    }
}
