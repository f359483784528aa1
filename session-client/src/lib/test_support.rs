use auth::Claims;
use auth::JwtHandler;
use chrono::Duration;

use crate::domain::token::models::TokenPair;

pub const ISSUER_SECRET: &[u8] = b"unit-test-issuer-secret-32-bytes!!";

/// Access token in the Auth API's claim layout.
pub fn access_token(id: i64, username: &str, role: &str, lifetime: Duration) -> String {
    let claims = Claims::for_account(id, username, role, lifetime)
        .with_extra("firstName", "First")
        .with_extra("lastName", "Last");

    JwtHandler::new(ISSUER_SECRET)
        .encode(&claims)
        .expect("Failed to encode access token")
}

/// Token pair whose access token is valid for ten minutes.
pub fn live_pair(username: &str, role: &str) -> TokenPair {
    TokenPair::new(
        access_token(1, username, role, Duration::minutes(10)),
        format!("refresh-{}", username),
    )
}

/// Token pair whose access token expired a minute ago.
pub fn expired_pair(username: &str, role: &str) -> TokenPair {
    TokenPair::new(
        access_token(1, username, role, Duration::minutes(-1)),
        format!("refresh-{}", username),
    )
}
