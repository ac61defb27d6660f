//! Test post document schema

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;
use crate::db::Post;

/// Collection name for test posts
pub const POST_COLLECTION: &str = "posts";

/// Counter name used to allocate post ids
pub const POST_SEQUENCE: &str = "posts";

/// Post document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct PostDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    /// Public numeric id, allocated from the `posts` counter
    pub id: i64,

    /// Username of the author, if the post was made while logged in
    #[serde(default)]
    pub op: Option<String>,

    /// Creation time as Unix seconds
    pub date: f64,

    pub title: String,

    #[serde(default)]
    pub content: Option<String>,

    #[serde(default)]
    pub color: i64,
}

impl From<Post> for PostDoc {
    fn from(post: Post) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            id: post.id,
            op: post.op,
            date: post.date,
            title: post.title,
            content: post.content,
            color: post.color,
        }
    }
}

impl From<PostDoc> for Post {
    fn from(doc: PostDoc) -> Self {
        Self {
            id: doc.id,
            op: doc.op,
            date: doc.date,
            title: doc.title,
            content: doc.content,
            color: doc.color,
        }
    }
}

impl IntoIndexes for PostDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "id": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("id_unique".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "date": 1 },
                Some(IndexOptions::builder().name("date_index".to_string()).build()),
            ),
        ]
    }
}

impl MutMetadata for PostDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
