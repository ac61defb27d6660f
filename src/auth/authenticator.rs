//! Login and per-request authentication
//!
//! Flow:
//! 1. `login` checks credentials (guests skip this) and issues a token
//! 2. `authenticate` turns a presented token back into an [`Identity`],
//!    re-reading the account's role from the store every time

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::auth::identity::{is_guest, Identity};
use crate::auth::jwt::{TokenCodec, TokenError};
use crate::auth::password::spawn_verify;
use crate::db::CredentialStore;
use crate::types::{Result, WicketError};

/// Bad username or password, the same for both
pub const LOGIN_FAILED: &str = "로그인 실패";
/// No token presented
pub const LOGIN_REQUIRED: &str = "로그인 필요";
/// Token signature fine, but past its expiry
pub const SESSION_EXPIRED: &str = "인증 만료, 재로그인 필요";
/// Anything else wrong with the token or its subject
pub const AUTH_FAILED: &str = "인증 실패, 재로그인 필요";

pub const TOKEN_TYPE: &str = "bearer";

/// Successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub username: String,
    pub access_token: String,
    pub token_type: String,
    pub is_admin: bool,
}

#[derive(Clone)]
pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    codec: TokenCodec,
}

impl Authenticator {
    pub fn new(store: Arc<dyn CredentialStore>, codec: TokenCodec) -> Self {
        Self { store, codec }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Exchange credentials for a session token.
    ///
    /// Guest usernames get a token immediately, whatever the password.
    pub async fn login(&self, username: &str, password: Option<&str>) -> Result<TokenResponse> {
        if is_guest(username) {
            debug!("Guest login: {}", username);
            return self.token_response(username, false);
        }

        let Some(account) = self.store.get(username).await? else {
            warn!("Login failed for {}: no such account", username);
            return Err(login_failed());
        };

        let Some(password) = password else {
            warn!("Login failed for {}: no password", username);
            return Err(login_failed());
        };

        if !spawn_verify(password.to_string(), account.pw_hash.clone()).await? {
            warn!("Login failed for {}: wrong password", username);
            return Err(login_failed());
        }

        info!("Login: {}", account.username);
        self.token_response(&account.username, account.is_admin)
    }

    /// Resolve a presented token to the caller's identity
    pub async fn authenticate(&self, token: Option<&str>) -> Result<Identity> {
        let Some(token) = token else {
            return Err(WicketError::Unauthorized(LOGIN_REQUIRED.into()));
        };

        let claims = self.codec.verify(token).map_err(|e| match e {
            TokenError::Expired => WicketError::Unauthorized(SESSION_EXPIRED.into()),
            TokenError::Invalid(_) => auth_failed(),
        })?;

        let Some(username) = claims.sub else {
            debug!("Token has no subject");
            return Err(auth_failed());
        };

        if is_guest(&username) {
            return Ok(Identity::guest(username));
        }

        match self.store.get(&username).await? {
            Some(account) => Ok(Identity::registered(&account)),
            None => {
                debug!("Token subject {} has no account", username);
                Err(auth_failed())
            }
        }
    }

    /// Like [`authenticate`](Self::authenticate), but a missing token is
    /// `Ok(None)` rather than an error
    pub async fn authenticate_optional(&self, token: Option<&str>) -> Result<Option<Identity>> {
        match token {
            None => Ok(None),
            Some(_) => self.authenticate(token).await.map(Some),
        }
    }

    fn token_response(&self, username: &str, is_admin: bool) -> Result<TokenResponse> {
        let access_token = self.codec.issue(username, None)?;
        Ok(TokenResponse {
            username: username.to_string(),
            access_token,
            token_type: TOKEN_TYPE.to_string(),
            is_admin,
        })
    }
}

fn login_failed() -> WicketError {
    WicketError::Unauthorized(LOGIN_FAILED.into())
}

fn auth_failed() -> WicketError {
    WicketError::Unauthorized(AUTH_FAILED.into())
}
