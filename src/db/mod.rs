//! Persistence for wicket
//!
//! MongoDB backs production deployments. The in-memory stores serve dev mode
//! when MongoDB is unreachable, and tests.

mod accounts;
pub mod mongo;
mod posts;
pub mod schemas;

pub use accounts::{Account, CredentialStore, MemoryCredentialStore, MongoCredentialStore};
pub use mongo::{MongoClient, MongoCollection};
pub use posts::{MemoryPostStore, MongoPostStore, NewPost, Post, PostStore};
