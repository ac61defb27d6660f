//! Services layer for wicket
//!
//! Business logic that sits between the HTTP routes and the stores.
//!
//! ## Services
//!
//! - **AccountAdmin**: admin-gated account creation, password change and deletion
//! - **PostService**: the test post resource, with owner-gated deletion

pub mod accounts;
pub mod posts;

pub use accounts::{AccountAdmin, AccountRequest, DetailResponse};
pub use posts::{DeleteRequest, PostRequest, PostService};

/// Reported for any missing account or post
pub const NOT_FOUND_DETAIL: &str = "업서요";
