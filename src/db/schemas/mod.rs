//! Database schemas for wicket
//!
//! Defines MongoDB document structures for accounts and test posts.

mod account;
mod metadata;
mod post;

pub use account::{AccountDoc, ACCOUNT_COLLECTION};
pub use metadata::Metadata;
pub use post::{PostDoc, POST_COLLECTION, POST_SEQUENCE};
