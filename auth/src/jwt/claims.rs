use std::collections::HashMap;

use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Generic JWT claims structure.
///
/// Standard RFC 7519 claims are typed fields; everything else the issuer
/// embeds (user id, names, role) lands in the flattened `extra` map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Claims {
    /// Subject. The Auth API puts the username here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Expiration time (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Issued at (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// JWT ID (unique token identifier)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    /// Additional custom fields (flattened into token)
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Claims {
    /// Create new empty claims.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create claims for an account in the layout the Auth API issues.
    ///
    /// # Arguments
    /// * `id` - Numeric account identifier (stored in `extra.id`)
    /// * `username` - Username (stored in `sub`)
    /// * `role` - Role name (stored in `extra.role`)
    /// * `lifetime` - Time until the token expires
    ///
    /// # Returns
    /// Claims with sub, id, role, iat and exp set
    pub fn for_account(
        id: i64,
        username: impl ToString,
        role: impl ToString,
        lifetime: Duration,
    ) -> Self {
        let now = Utc::now();

        Self::new()
            .with_subject(username)
            .with_issued_at(now.timestamp())
            .with_expiration((now + lifetime).timestamp())
            .with_extra("id", id)
            .with_extra("role", role.to_string())
    }

    /// Set subject.
    pub fn with_subject(mut self, sub: impl ToString) -> Self {
        self.sub = Some(sub.to_string());
        self
    }

    /// Set expiration (Unix timestamp).
    pub fn with_expiration(mut self, exp: i64) -> Self {
        self.exp = Some(exp);
        self
    }

    /// Set issued at (Unix timestamp).
    pub fn with_issued_at(mut self, iat: i64) -> Self {
        self.iat = Some(iat);
        self
    }

    /// Set token identifier.
    pub fn with_token_id(mut self, jti: impl ToString) -> Self {
        self.jti = Some(jti.to_string());
        self
    }

    /// Add a custom field.
    pub fn with_extra(mut self, key: impl ToString, value: impl Serialize) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.extra.insert(key.to_string(), json_value);
        }
        self
    }

    /// Get a custom string field.
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(|v| v.as_str())
    }

    /// Get a custom integer field.
    ///
    /// Accepts both a JSON number and a string holding a decimal integer,
    /// since issuers disagree on how numeric ids are serialized.
    pub fn extra_i64(&self, key: &str) -> Option<i64> {
        match self.extra.get(key)? {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Check if token is expired.
    ///
    /// A token without an `exp` claim is never considered expired here;
    /// callers that must fail closed check `exp` themselves.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp.map_or(false, |exp| exp < current_timestamp)
    }
}
