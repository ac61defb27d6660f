//! Wicket - the small door in the big gate
//!
//! Account authentication and stateless session tokens, with an
//! admin/ownership authorization model gating account management and a small
//! test post resource.
//!
//! ## Modules
//!
//! - **auth**: password hashing, token codec, authenticator, authorizer
//! - **db**: credential and post stores (MongoDB and in-memory)
//! - **services**: account administration and test posts
//! - **routes** / **server**: the hyper HTTP surface

pub mod auth;
pub mod config;
pub mod db;
pub mod routes;
pub mod server;
pub mod services;
pub mod types;

pub use config::Args;
pub use server::{run, serve, AppState};
pub use types::{Result, WicketError};
