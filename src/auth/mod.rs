//! Authentication and authorization for wicket
//!
//! Provides:
//! - Password hashing with Argon2
//! - Session token issuance and verification (HS256 JWT)
//! - Login and per-request authentication
//! - Admin and self-or-admin authorization checks

pub mod authenticator;
pub mod authorizer;
pub mod identity;
pub mod jwt;
pub mod password;

pub use authenticator::{Authenticator, TokenResponse};
pub use authorizer::{require_admin, require_self_or_admin, Target};
pub use identity::{is_guest, Identity, GUEST_PREFIX};
pub use jwt::{
    extract_token_from_header, Claims, TokenCodec, TokenError, DEFAULT_EXPIRY_MINUTES,
};
pub use password::{hash_password, spawn_hash, spawn_verify, verify_password};
