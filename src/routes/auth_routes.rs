//! Authentication routes
//!
//! - `POST /login`: exchange a username and password for a bearer token.
//!   Accepts the OAuth2 password form (`application/x-www-form-urlencoded`)
//!   or the same fields as JSON.
//! - `POST /auth`: resolve the presented bearer token to `{username, is_admin}`

use std::sync::Arc;

use hyper::body::Incoming;
use hyper::header::CONTENT_TYPE;
use hyper::{Request, Response, StatusCode};
use serde::Deserialize;

use crate::auth::extract_token_from_header;
use crate::routes::{error_response, get_auth_header, json_response, read_body, BoxBody};
use crate::server::AppState;
use crate::types::{Result, WicketError};

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    #[serde(default)]
    password: Option<String>,
}

fn is_json(req: &Request<Incoming>) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("application/json"))
        .unwrap_or(false)
}

async fn parse_login(req: Request<Incoming>) -> Result<LoginRequest> {
    let json = is_json(&req);
    let bytes = read_body(req).await?;

    if json {
        serde_json::from_slice(&bytes)
            .map_err(|e| WicketError::Http(format!("Invalid JSON: {}", e)))
    } else {
        serde_urlencoded::from_bytes(&bytes)
            .map_err(|e| WicketError::Http(format!("Invalid form: {}", e)))
    }
}

/// Bearer token presented with the request, if any
pub(crate) fn bearer_token(req: &Request<Incoming>) -> Option<String> {
    extract_token_from_header(get_auth_header(req)).map(str::to_owned)
}

/// POST /login
pub async fn handle_login(req: Request<Incoming>, state: Arc<AppState>) -> Response<BoxBody> {
    let body = match parse_login(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };

    match state
        .authenticator
        .login(&body.username, body.password.as_deref())
        .await
    {
        Ok(token) => json_response(StatusCode::OK, &token),
        Err(e) => error_response(&e),
    }
}

/// POST /auth
pub async fn handle_auth(req: Request<Incoming>, state: Arc<AppState>) -> Response<BoxBody> {
    let token = bearer_token(&req);

    match state.authenticator.authenticate(token.as_deref()).await {
        Ok(identity) => json_response(StatusCode::OK, &identity),
        Err(e) => error_response(&e),
    }
}
