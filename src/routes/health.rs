//! Liveness endpoints
//!
//! - `GET /` answers a fixed marker
//! - `GET /ping` adds the server's clock, as Unix seconds

use chrono::Utc;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::routes::{json_response, BoxBody};

const MARKER: &str = "e";

#[derive(Serialize)]
struct RootResponse {
    ecyc: &'static str,
}

#[derive(Serialize)]
struct PingResponse {
    ecyc: &'static str,
    time: f64,
}

pub fn root() -> Response<BoxBody> {
    json_response(StatusCode::OK, &RootResponse { ecyc: MARKER })
}

pub fn ping() -> Response<BoxBody> {
    let time = Utc::now().timestamp_micros() as f64 / 1_000_000.0;
    json_response(StatusCode::OK, &PingResponse { ecyc: MARKER, time })
}
