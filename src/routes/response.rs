//! Shared request and response helpers

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE, WWW_AUTHENTICATE};
use hyper::{Request, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use tracing::{error, warn};

use crate::types::{Result, WicketError};

pub type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// Largest request body accepted
pub const MAX_BODY_BYTES: usize = 10 * 1024;

fn full_body(data: impl Into<Bytes>) -> BoxBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<BoxBody> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());

    let mut response = Response::new(full_body(json));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

/// `{"detail": ...}` with the error's status, plus a bearer challenge on 401
pub fn error_response(err: &WicketError) -> Response<BoxBody> {
    if err.is_server_error() {
        error!("Request failed: {}", err);
    }

    let mut response = json_response(err.status_code(), &json!({ "detail": err.detail() }));
    if let Some(challenge) = err.challenge() {
        response
            .headers_mut()
            .insert(WWW_AUTHENTICATE, HeaderValue::from_static(challenge));
    }
    response
}

pub fn not_found_response(path: &str) -> Response<BoxBody> {
    warn!("No route for {}", path);
    json_response(StatusCode::NOT_FOUND, &json!({ "detail": "Not Found" }))
}

/// CORS preflight response; the server adds the CORS headers
pub fn preflight_response() -> Response<BoxBody> {
    let mut response = Response::new(full_body(Bytes::new()));
    *response.status_mut() = StatusCode::NO_CONTENT;
    response
}

/// Read the whole request body, refusing anything over [`MAX_BODY_BYTES`]
pub async fn read_body<B>(req: Request<B>) -> Result<Bytes>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let collected = Limited::new(req.into_body(), MAX_BODY_BYTES)
        .collect()
        .await
        .map_err(|e| {
            if e.downcast_ref::<LengthLimitError>().is_some() {
                WicketError::Http("Request body too large".into())
            } else {
                WicketError::Http(format!("Failed to read body: {}", e))
            }
        })?;

    Ok(collected.to_bytes())
}

pub async fn parse_json_body<T, B>(req: Request<B>) -> Result<T>
where
    T: DeserializeOwned,
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let bytes = read_body(req).await?;
    serde_json::from_slice(&bytes).map_err(|e| WicketError::Http(format!("Invalid JSON: {}", e)))
}

pub fn get_auth_header<B>(req: &Request<B>) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
}
