use thiserror::Error;

use crate::domain::identity::errors::MalformedTokenError;
use crate::domain::token::errors::TokenStoreError;

/// Fallback message when the Auth API rejects credentials without saying why.
pub const GENERIC_AUTH_FAILURE: &str = "authentication failed";

/// Failures reported by the Auth API collaborator
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthApiError {
    #[error("Auth API rejected the request ({status}): {}", .message.as_deref().unwrap_or(GENERIC_AUTH_FAILURE))]
    Rejected { status: u16, message: Option<String> },

    #[error("Auth API unreachable: {0}")]
    Transport(String),

    #[error("Auth API returned an unexpected response: {0}")]
    InvalidResponse(String),
}

/// Top-level error for session operations
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("{0}")]
    InvalidCredentials(String),

    #[error("Malformed token: {0}")]
    MalformedToken(#[from] MalformedTokenError),

    #[error("No session to refresh")]
    NoSession,

    #[error("Session expired, please log in again")]
    SessionExpired,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Token storage error: {0}")]
    Storage(#[from] TokenStoreError),
}

impl From<AuthApiError> for SessionError {
    fn from(err: AuthApiError) -> Self {
        match err {
            AuthApiError::Rejected { message, .. } => SessionError::InvalidCredentials(
                message.unwrap_or_else(|| GENERIC_AUTH_FAILURE.to_string()),
            ),
            AuthApiError::Transport(e) | AuthApiError::InvalidResponse(e) => {
                SessionError::Network(e)
            }
        }
    }
}
