//! Token utilities shared by the workspace.
//!
//! - JWT claims in the layout the Auth API issues
//! - Signed encode / verified decode (used by issuers and test harnesses)
//! - Unverified decode for clients that only inspect their own tokens
//!
//! # Examples
//!
//! ## Issuing and verifying
//! ```
//! use auth::{Claims, JwtHandler};
//!
//! let handler = JwtHandler::new(b"secret_key_at_least_32_bytes_long!");
//! let claims = Claims::new().with_subject("alice").with_extra("role", "ADMIN");
//! let token = handler.encode(&claims).unwrap();
//! let decoded: Claims = handler.decode(&token).unwrap();
//! assert_eq!(decoded.extra_str("role"), Some("ADMIN"));
//! ```
//!
//! ## Client-side inspection
//! ```
//! use auth::{Claims, JwtHandler};
//!
//! let issuer = JwtHandler::new(b"secret_key_at_least_32_bytes_long!");
//! let token = issuer.encode(&Claims::new().with_subject("alice")).unwrap();
//!
//! // The client has no secret; it reads the payload without verification.
//! let claims: Claims = JwtHandler::inspector().decode_unverified(&token).unwrap();
//! assert_eq!(claims.sub.as_deref(), Some("alice"));
//! ```

pub mod jwt;

// Re-export commonly used items
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
