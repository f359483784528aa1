use thiserror::Error;

/// Error for tokens that cannot be turned into an identity
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MalformedTokenError {
    #[error("Token is not a readable JWT: {0}")]
    InvalidFormat(String),

    #[error("Token is missing claim: {0}")]
    MissingClaim(&'static str),

    #[error("Token claim '{claim}' is invalid: {reason}")]
    InvalidClaim { claim: &'static str, reason: String },
}
