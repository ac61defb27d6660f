//! HTTP routes for wicket

pub mod accounts;
pub mod auth_routes;
pub mod health;
pub mod posts;
mod response;

pub use accounts::handle_account_request;
pub use auth_routes::{handle_auth, handle_login};
pub use health::{ping, root};
pub use posts::handle_test_posts_request;
pub use response::{
    error_response, get_auth_header, json_response, not_found_response, parse_json_body,
    preflight_response, read_body, BoxBody, MAX_BODY_BYTES,
};
