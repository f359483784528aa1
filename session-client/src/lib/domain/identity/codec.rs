use auth::Claims;
use auth::JwtHandler;

use crate::domain::identity::errors::MalformedTokenError;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::Role;
use crate::domain::identity::models::UserId;

/// Turns an access token into an [`Identity`].
///
/// Decoding is presentation-only: the signature is not verified. The token is
/// trusted because it came straight from a login or refresh call.
pub struct IdentityCodec;

impl IdentityCodec {
    /// Decode an access token into an identity.
    ///
    /// # Arguments
    /// * `token` - Access token as returned by the Auth API
    ///
    /// # Returns
    /// Fully populated identity with `active` set
    ///
    /// # Errors
    /// * `InvalidFormat` - Not a JWT with a JSON payload
    /// * `MissingClaim` - One of sub, id, firstName, lastName, role is absent
    /// * `InvalidClaim` - A claim is present with the wrong type
    pub fn decode(token: &str) -> Result<Identity, MalformedTokenError> {
        let claims: Claims = JwtHandler::inspector()
            .decode_unverified(token)
            .map_err(|e| MalformedTokenError::InvalidFormat(e.to_string()))?;

        Self::from_claims(&claims)
    }

    fn from_claims(claims: &Claims) -> Result<Identity, MalformedTokenError> {
        let username = claims
            .sub
            .clone()
            .filter(|sub| !sub.is_empty())
            .ok_or(MalformedTokenError::MissingClaim("sub"))?;

        let id = match claims.extra.get("id") {
            None | Some(serde_json::Value::Null) => {
                return Err(MalformedTokenError::MissingClaim("id"))
            }
            Some(value) => claims.extra_i64("id").ok_or_else(|| {
                MalformedTokenError::InvalidClaim {
                    claim: "id",
                    reason: format!("expected an integer, got {}", value),
                }
            })?,
        };

        let role = Self::required_str(claims, "role")?;
        if role.is_empty() {
            return Err(MalformedTokenError::InvalidClaim {
                claim: "role",
                reason: "empty role".to_string(),
            });
        }

        Ok(Identity {
            id: UserId(id),
            username,
            first_name: Self::required_str(claims, "firstName")?.to_string(),
            last_name: Self::required_str(claims, "lastName")?.to_string(),
            role: Role::new(role),
            active: true,
        })
    }

    fn required_str<'a>(
        claims: &'a Claims,
        claim: &'static str,
    ) -> Result<&'a str, MalformedTokenError> {
        if let Some(value) = claims.extra_str(claim) {
            return Ok(value);
        }

        match claims.extra.get(claim) {
            None | Some(serde_json::Value::Null) => Err(MalformedTokenError::MissingClaim(claim)),
            Some(other) => Err(MalformedTokenError::InvalidClaim {
                claim,
                reason: format!("expected a string, got {}", other),
            }),
        }
    }
}
