//! Session token handling
//!
//! Tokens are stateless HS256 JWTs carrying only the subject and its
//! issue/expiry timestamps. There is no role claim; the
//! authenticator looks the role up again on every request.
//!
//! Security notes:
//! - Signature is checked before expiry, with zero leeway
//! - Default expiry is 7 days
//! - There is no revocation list; a leaked token lives until it expires

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::WicketError;

/// Default token lifetime in minutes (one week)
pub const DEFAULT_EXPIRY_MINUTES: u64 = 1440 * 7;

/// Lifetime used when the configured lifetime is zero
const FALLBACK_EXPIRY_MINUTES: u64 = 15;

/// Longest accepted lifetime in minutes (ten years)
pub const MAX_EXPIRY_MINUTES: u64 = 1440 * 365 * 10;

const MIN_SECRET_LEN: usize = 32;

const DEV_SECRET: &str = "dev-mode-secret-not-for-production-use-123456";

/// Payload stored in the token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username the token was issued to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Why a token was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),
}

/// Signs and verifies session tokens with the process-wide secret
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    default_ttl: Duration,
}

impl TokenCodec {
    /// Create a codec from a production secret
    ///
    /// Returns an error if the secret is empty or too short
    pub fn new(secret: &str, expiry_minutes: u64) -> Result<Self, WicketError> {
        if secret.is_empty() {
            return Err(WicketError::Config(
                "AUTH_SECRET_KEY is required in production mode".into(),
            ));
        }

        if secret.len() < MIN_SECRET_LEN {
            return Err(WicketError::Config(format!(
                "AUTH_SECRET_KEY must be at least {MIN_SECRET_LEN} characters"
            )));
        }

        Self::from_secret(secret, expiry_minutes)
    }

    /// Create a codec for dev mode with a well-known secret
    pub fn new_dev(expiry_minutes: u64) -> Result<Self, WicketError> {
        Self::from_secret(DEV_SECRET, expiry_minutes)
    }

    fn from_secret(secret: &str, expiry_minutes: u64) -> Result<Self, WicketError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            default_ttl: expiry_duration(expiry_minutes)?,
        })
    }

    /// Lifetime applied when [`issue`](Self::issue) gets no override
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Issue a token for `subject`, valid for `ttl` or the default lifetime
    pub fn issue(&self, subject: &str, ttl: Option<Duration>) -> Result<String, WicketError> {
        let now = Utc::now();
        let expires = now
            .checked_add_signed(ttl.unwrap_or(self.default_ttl))
            .ok_or_else(|| WicketError::Internal("Token expiry out of range".into()))?;

        let claims = Claims {
            sub: Some(subject.to_string()),
            iat: now.timestamp(),
            exp: expires.timestamp(),
        };

        self.sign(&claims)
    }

    /// Sign arbitrary claims
    pub fn sign(&self, claims: &Claims) -> Result<String, WicketError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| WicketError::Internal(format!("Failed to generate token: {e}")))
    }

    /// Verify signature, then expiry, and decode the claims
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => {
                    debug!("Token rejected: {err}");
                    TokenError::Invalid(err.to_string())
                }
            })
    }
}

/// Token lifetime for a configured number of minutes; zero means the fallback
fn expiry_duration(expiry_minutes: u64) -> Result<Duration, WicketError> {
    let minutes = match expiry_minutes {
        0 => FALLBACK_EXPIRY_MINUTES,
        m if m > MAX_EXPIRY_MINUTES => {
            return Err(WicketError::Config(format!(
                "TOKEN_EXPIRY_MINUTES must be at most {MAX_EXPIRY_MINUTES}"
            )));
        }
        m => m,
    };

    i64::try_from(minutes)
        .ok()
        .and_then(Duration::try_minutes)
        .ok_or_else(|| WicketError::Config("TOKEN_EXPIRY_MINUTES out of range".into()))
}

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// The scheme is matched case-insensitively. Any other scheme, or a missing
/// or empty token, yields `None`.
pub fn extract_token_from_header(auth_header: Option<&str>) -> Option<&str> {
    let (scheme, token) = auth_header?.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
