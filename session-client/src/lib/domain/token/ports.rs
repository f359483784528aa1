use chrono::Utc;

use crate::domain::token::errors::TokenStoreError;
use crate::domain::token::models::is_expired_at;
use crate::domain::token::models::TokenPair;

/// Well-known storage key for the access token.
pub const ACCESS_TOKEN_KEY: &str = "jwt_token";

/// Well-known storage key for the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Durable persistence for the current token pair.
///
/// All operations are synchronous. Implementations hold both tokens or
/// neither; a store with only one entry reads as empty.
pub trait TokenStore: Send + Sync + 'static {
    /// Read the stored token pair.
    ///
    /// # Returns
    /// The pair when both entries are present, `None` otherwise. Never fails:
    /// unreadable storage is reported as absent.
    fn get(&self) -> Option<TokenPair>;

    /// Persist a token pair, replacing whatever was stored.
    ///
    /// # Errors
    /// * `Io` - Underlying storage could not be written
    /// * `Serialization` - Pair could not be encoded
    fn set(&self, pair: &TokenPair) -> Result<(), TokenStoreError>;

    /// Remove both entries.
    ///
    /// # Errors
    /// * `Io` - Underlying storage could not be written
    fn clear(&self) -> Result<(), TokenStoreError>;

    /// Check whether a token's embedded expiry has passed.
    ///
    /// A token that cannot be parsed is expired.
    fn is_expired(&self, token: &str) -> bool {
        is_expired_at(token, Utc::now().timestamp())
    }
}
