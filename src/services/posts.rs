//! Test posts
//!
//! Anyone may create a post. A post made while logged in records its author
//! in `op`, and only that author or an admin may delete it afterwards.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::auth::authenticator::LOGIN_REQUIRED;
use crate::auth::{require_self_or_admin, Identity};
use crate::db::{NewPost, Post, PostStore};
use crate::services::NOT_FOUND_DETAIL;
use crate::types::{Result, WicketError};

/// Body of `POST /test-posts/`
#[derive(Debug, Clone, Deserialize)]
pub struct PostRequest {
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub color: i64,
}

/// Body of `DELETE /test-posts/`
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DeleteRequest {
    pub id: i64,
}

#[derive(Clone)]
pub struct PostService {
    store: Arc<dyn PostStore>,
}

impl PostService {
    pub fn new(store: Arc<dyn PostStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Post>> {
        self.store.list().await
    }

    pub async fn get(&self, id: i64) -> Result<Post> {
        self.store.get(id).await?.ok_or_else(not_found)
    }

    /// Store a new post and return the updated list
    pub async fn create(&self, req: PostRequest, author: Option<&Identity>) -> Result<Vec<Post>> {
        let post = self
            .store
            .insert(NewPost {
                op: author.map(|a| a.username.clone()),
                date: unix_now(),
                title: req.title,
                content: req.content,
                color: req.color,
            })
            .await?;

        info!("Post {} created by {}", post.id, post.op.as_deref().unwrap_or("anonymous"));
        self.store.list().await
    }

    /// Delete a post and return the updated list
    pub async fn delete(&self, id: i64, caller: Option<&Identity>) -> Result<Vec<Post>> {
        let post = self.get(id).await?;

        if let Some(op) = &post.op {
            let Some(caller) = caller else {
                return Err(WicketError::Forbidden(LOGIN_REQUIRED.into()));
            };
            require_self_or_admin(caller, op)?;
        }

        self.store.delete(id).await.map_err(|e| match e {
            WicketError::NotFound(_) => not_found(),
            other => other,
        })?;

        info!("Post {} deleted", id);
        self.store.list().await
    }
}

fn not_found() -> WicketError {
    WicketError::NotFound(NOT_FOUND_DETAIL.into())
}

fn unix_now() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
