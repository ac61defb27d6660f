//! Account administration routes
//!
//! All take a JSON body `{username, password?}` and an admin bearer token:
//! - `POST /create-account` (body may also carry `is_admin`)
//! - `POST /change-password`
//! - `POST /delete-account`

use std::sync::Arc;

use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};

use crate::auth::require_admin;
use crate::routes::auth_routes::bearer_token;
use crate::routes::{error_response, json_response, not_found_response, parse_json_body, BoxBody};
use crate::server::AppState;
use crate::services::AccountRequest;

/// Whether `path` is one of the account administration endpoints
pub fn is_account_path(path: &str) -> bool {
    matches!(path, "/create-account" | "/change-password" | "/delete-account")
}

pub async fn handle_account_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let path = req.uri().path().to_string();
    if !is_account_path(&path) {
        return not_found_response(&path);
    }

    let token = bearer_token(&req);
    let caller = match state.authenticator.authenticate(token.as_deref()).await {
        Ok(identity) => identity,
        Err(e) => return error_response(&e),
    };

    // permission is checked before the body is looked at
    if let Err(e) = require_admin(&caller) {
        return error_response(&e);
    }

    let body: AccountRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };

    let result = match path.as_str() {
        "/create-account" => state.accounts.create(&caller, &body).await,
        "/change-password" => state.accounts.change_password(&caller, &body).await,
        _ => state.accounts.delete(&caller, &body.username).await,
    };

    match result {
        Ok(detail) => json_response(StatusCode::OK, &detail),
        Err(e) => error_response(&e),
    }
}
