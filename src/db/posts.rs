//! Test post storage

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use bson::doc;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{MongoClient, MongoCollection};
use crate::db::schemas::{PostDoc, POST_COLLECTION, POST_SEQUENCE};
use crate::types::{Result, WicketError};

/// A stored post, as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub op: Option<String>,
    pub date: f64,
    pub title: String,
    pub content: Option<String>,
    pub color: i64,
}

/// A post before the store has assigned its id
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub op: Option<String>,
    pub date: f64,
    pub title: String,
    pub content: Option<String>,
    pub color: i64,
}

impl NewPost {
    fn with_id(self, id: i64) -> Post {
        Post {
            id,
            op: self.op,
            date: self.date,
            title: self.title,
            content: self.content,
            color: self.color,
        }
    }
}

#[async_trait]
pub trait PostStore: Send + Sync {
    /// All posts, ascending by id
    async fn list(&self) -> Result<Vec<Post>>;

    async fn get(&self, id: i64) -> Result<Option<Post>>;

    /// Assigns the next id and stores the post
    async fn insert(&self, post: NewPost) -> Result<Post>;

    /// Fails with [`WicketError::NotFound`] if there is no such post
    async fn delete(&self, id: i64) -> Result<()>;
}

fn no_such_post(id: i64) -> WicketError {
    WicketError::NotFound(format!("Post {} not found", id))
}

// =============================================================================
// In-memory implementation
// =============================================================================

#[derive(Debug)]
pub struct MemoryPostStore {
    posts: DashMap<i64, Post>,
    next_id: AtomicI64,
}

impl Default for MemoryPostStore {
    fn default() -> Self {
        Self {
            posts: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn list(&self) -> Result<Vec<Post>> {
        let mut posts: Vec<Post> = self.posts.iter().map(|p| p.value().clone()).collect();
        posts.sort_by_key(|p| p.id);
        Ok(posts)
    }

    async fn get(&self, id: i64) -> Result<Option<Post>> {
        Ok(self.posts.get(&id).map(|p| p.value().clone()))
    }

    async fn insert(&self, post: NewPost) -> Result<Post> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let post = post.with_id(id);
        self.posts.insert(id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.posts
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| no_such_post(id))
    }
}

// =============================================================================
// MongoDB implementation
// =============================================================================

pub struct MongoPostStore {
    mongo: MongoClient,
    collection: MongoCollection<PostDoc>,
}

impl MongoPostStore {
    pub async fn new(mongo: &MongoClient) -> Result<Self> {
        let collection = mongo.collection::<PostDoc>(POST_COLLECTION).await?;
        Ok(Self {
            mongo: mongo.clone(),
            collection,
        })
    }
}

#[async_trait]
impl PostStore for MongoPostStore {
    async fn list(&self) -> Result<Vec<Post>> {
        let mut posts: Vec<Post> = self
            .collection
            .find_many(doc! {})
            .await?
            .into_iter()
            .map(Post::from)
            .collect();
        posts.sort_by_key(|p| p.id);
        Ok(posts)
    }

    async fn get(&self, id: i64) -> Result<Option<Post>> {
        let found = self.collection.find_one(doc! { "id": id }).await?;
        Ok(found.map(Post::from))
    }

    async fn insert(&self, post: NewPost) -> Result<Post> {
        let id = self.mongo.next_sequence(POST_SEQUENCE).await?;
        let post = post.with_id(id);
        self.collection.insert_one(PostDoc::from(post.clone())).await?;
        Ok(post)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;
        if result.deleted_count == 0 {
            return Err(no_such_post(id));
        }
        Ok(())
    }
}
