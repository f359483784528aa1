use async_trait::async_trait;

use crate::domain::identity::models::Identity;
use crate::domain::session::errors::AuthApiError;
use crate::domain::session::errors::SessionError;
use crate::domain::session::models::Credentials;
use crate::domain::session::models::Registration;
use crate::domain::token::models::TokenPair;

/// Port for the Auth API collaborator.
#[async_trait]
pub trait AuthApi: Send + Sync + 'static {
    /// Exchange credentials for a token pair.
    ///
    /// # Errors
    /// * `Rejected` - Credentials refused, with the server's message if any
    /// * `Transport` - Request never got a response
    /// * `InvalidResponse` - Response body is not a token pair
    async fn login(&self, credentials: &Credentials) -> Result<TokenPair, AuthApiError>;

    /// Create an account and receive its first token pair.
    ///
    /// # Errors
    /// * `Rejected` - Registration refused, with the server's message if any
    /// * `Transport` - Request never got a response
    /// * `InvalidResponse` - Response body is not a token pair
    async fn register(&self, registration: &Registration) -> Result<TokenPair, AuthApiError>;

    /// Exchange a refresh token for a new token pair.
    ///
    /// # Errors
    /// * `Rejected` - Refresh token expired or revoked
    /// * `Transport` - Request never got a response
    /// * `InvalidResponse` - Response body is not a token pair
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthApiError>;
}

/// Port through which guards and request mediation observe the session.
///
/// Only the session manager mutates identity; consumers read it, and the
/// mediator may ask for a refresh.
#[async_trait]
pub trait SessionPort: Send + Sync + 'static {
    /// Authenticate with credentials and publish the resulting identity.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Rejected by the Auth API
    /// * `Network` - Auth API unreachable
    /// * `MalformedToken` - Issued token could not be decoded (session ends)
    /// * `Storage` - Token pair could not be persisted
    async fn login(&self, credentials: &Credentials) -> Result<Identity, SessionError>;

    /// Register an account and publish its identity.
    ///
    /// # Errors
    /// Same as `login`.
    async fn register(&self, registration: &Registration) -> Result<Identity, SessionError>;

    /// Trade the stored refresh token for a new pair.
    ///
    /// # Errors
    /// * `NoSession` - No stored token pair (session ends)
    /// * `SessionExpired` - Auth API refused or failed (session ends)
    /// * `MalformedToken` - Issued token could not be decoded (session ends)
    /// * `Storage` - New pair could not be persisted
    async fn refresh(&self) -> Result<Identity, SessionError>;

    /// End the session. Idempotent, never fails.
    fn logout(&self);

    /// Published identity, if its stored access token is still live.
    ///
    /// The reads below share this check: a published identity whose token is
    /// missing or expired ends the session and reads as logged out.
    fn current_identity(&self) -> Option<Identity>;

    /// Whether a live session exists: unexpired stored access token and a
    /// published identity.
    fn is_authenticated(&self) -> bool;

    /// Whether the live identity has exactly this role.
    fn has_role(&self, role: &str) -> bool;

    /// Stored access token while the session is live.
    fn access_token(&self) -> Option<String>;
}
