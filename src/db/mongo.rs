//! MongoDB client and collection wrapper

use bson::{doc, DateTime, Document};
use mongodb::{
    options::{IndexOptions, ReturnDocument, UpdateModifications},
    results::{DeleteResult, UpdateResult},
    Client, Collection, IndexModel,
};
use serde::{de::DeserializeOwned, Serialize};
use futures_util::{Stream, TryStreamExt};
use tracing::info;

use crate::db::schemas::Metadata;
use crate::types::WicketError;

/// Collection holding named monotonically increasing counters
pub const COUNTER_COLLECTION: &str = "counters";

/// Trait for schemas that provide index definitions
pub trait IntoIndexes {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)>;
}

/// Trait for schemas with mutable metadata
pub trait MutMetadata {
    fn mut_metadata(&mut self) -> &mut Metadata;
}

/// MongoDB client wrapper
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    db_name: String,
}

impl MongoClient {
    /// Create a new MongoDB client
    pub async fn new(uri: &str, db_name: &str) -> Result<Self, WicketError> {
        info!("Connecting to MongoDB at {}", uri);

        // Use serverSelectionTimeoutMS to avoid hanging on unreachable MongoDB
        let timeout_uri = if uri.contains('?') {
            format!("{}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        } else {
            format!("{}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        };

        let client = Client::with_uri_str(&timeout_uri)
            .await
            .map_err(|e| WicketError::Database(format!("Failed to connect to MongoDB: {}", e)))?;

        client
            .database(db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| WicketError::Database(format!("MongoDB ping failed: {}", e)))?;

        info!("Connected to MongoDB database '{}'", db_name);

        Ok(Self {
            client,
            db_name: db_name.to_string(),
        })
    }

    /// Get a typed collection
    pub async fn collection<T>(&self, name: &str) -> Result<MongoCollection<T>, WicketError>
    where
        T: Serialize + DeserializeOwned + Unpin + Send + Sync + Default + IntoIndexes + MutMetadata,
    {
        MongoCollection::new(&self.client, &self.db_name, name).await
    }

    /// Atomically bump the named counter and return its new value
    ///
    /// The first call for a name returns 1.
    pub async fn next_sequence(&self, name: &str) -> Result<i64, WicketError> {
        let counters = self
            .client
            .database(&self.db_name)
            .collection::<Document>(COUNTER_COLLECTION);

        let updated = counters
            .find_one_and_update(doc! { "_id": name }, doc! { "$inc": { "seq": 1_i64 } })
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| WicketError::Database(format!("Counter update failed: {}", e)))?;

        updated
            .and_then(|d| d.get_i64("seq").ok())
            .ok_or_else(|| WicketError::Database(format!("Counter '{}' missing after upsert", name)))
    }

    pub fn db_name(&self) -> &str {
        &self.db_name
    }
}

/// Typed MongoDB collection with automatic indexing
#[derive(Debug, Clone)]
pub struct MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync,
{
    inner: Collection<T>,
}

impl<T> MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync + Default + IntoIndexes + MutMetadata,
{
    /// Create a new collection and apply indexes
    pub async fn new(
        client: &Client,
        db_name: &str,
        collection_name: &str,
    ) -> Result<Self, WicketError> {
        let collection = client.database(db_name).collection::<T>(collection_name);
        let mongo_collection = MongoCollection { inner: collection };

        mongo_collection.apply_indexes().await?;

        Ok(mongo_collection)
    }

    /// Apply schema-defined indexes
    async fn apply_indexes(&self) -> Result<(), WicketError> {
        let schema_indices = T::into_indices();

        if schema_indices.is_empty() {
            return Ok(());
        }

        let indices: Vec<IndexModel> = schema_indices
            .into_iter()
            .map(|(keys, opts)| IndexModel::builder().keys(keys).options(opts).build())
            .collect();

        self.inner
            .create_indexes(indices)
            .await
            .map_err(|e| WicketError::Database(format!("Failed to create indexes: {}", e)))?;

        Ok(())
    }

    /// Insert a document, setting metadata timestamps
    ///
    /// A unique index violation comes back as [`WicketError::Conflict`].
    pub async fn insert_one(&self, mut item: T) -> Result<(), WicketError> {
        let metadata = item.mut_metadata();
        metadata.created_at = Some(DateTime::now());
        metadata.updated_at = Some(DateTime::now());

        self.inner.insert_one(item).await.map_err(|e| {
            let error_str = e.to_string();
            if error_str.contains("duplicate key") || error_str.contains("E11000") {
                WicketError::Conflict(error_str)
            } else {
                WicketError::Database(format!("Insert failed: {}", e))
            }
        })?;

        Ok(())
    }

    /// Find one document by filter
    pub async fn find_one(&self, filter: Document) -> Result<Option<T>, WicketError> {
        self.inner
            .find_one(filter)
            .await
            .map_err(|e| WicketError::Database(format!("Find failed: {}", e)))
    }

    /// Find many documents by filter
    pub async fn find_many(&self, filter: Document) -> Result<Vec<T>, WicketError> {
        let cursor = self
            .inner
            .find(filter)
            .await
            .map_err(|e| WicketError::Database(format!("Find failed: {}", e)))?;

        collect_documents(cursor).await
    }

    /// Update one document
    pub async fn update_one(
        &self,
        filter: Document,
        update: impl Into<UpdateModifications>,
    ) -> Result<UpdateResult, WicketError> {
        self.inner
            .update_one(filter, update.into())
            .await
            .map_err(|e| WicketError::Database(format!("Update failed: {}", e)))
    }

    /// Permanently remove one document
    pub async fn delete_one(&self, filter: Document) -> Result<DeleteResult, WicketError> {
        self.inner
            .delete_one(filter)
            .await
            .map_err(|e| WicketError::Database(format!("Delete failed: {}", e)))
    }
}

/// Drain a cursor, failing on the first document that cannot be read
async fn collect_documents<T, E, S>(cursor: S) -> Result<Vec<T>, WicketError>
where
    S: Stream<Item = Result<T, E>>,
    E: std::fmt::Display,
{
    cursor
        .try_collect()
        .await
        .map_err(|e| WicketError::Database(format!("Error reading document: {}", e)))
}
