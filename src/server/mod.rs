//! HTTP server for wicket

mod cors;
pub mod http;

pub use cors::CorsPolicy;
pub use http::{run, serve, AppState};
