//! Credential storage
//!
//! The [`CredentialStore`] trait hides where accounts live, so the
//! authenticator can run against MongoDB in production and an in-memory map
//! in dev mode and tests.

use async_trait::async_trait;
use bson::{doc, DateTime};
use dashmap::{mapref::entry::Entry, DashMap};
use tracing::debug;

use crate::db::mongo::{MongoClient, MongoCollection};
use crate::db::schemas::{AccountDoc, ACCOUNT_COLLECTION};
use crate::types::{Result, WicketError};

/// A stored account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub username: String,
    pub pw_hash: String,
    pub is_admin: bool,
}

/// Persistent mapping from username to credentials and role.
///
/// Usernames compare byte-for-byte. Each operation is atomic for a given
/// username.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, username: &str) -> Result<Option<Account>>;

    /// Fails with [`WicketError::Conflict`] if the username is taken
    async fn insert(&self, account: Account) -> Result<()>;

    /// Fails with [`WicketError::NotFound`] if there is no such account
    async fn update_password(&self, username: &str, pw_hash: String) -> Result<()>;

    /// Fails with [`WicketError::NotFound`] if there is no such account
    async fn delete(&self, username: &str) -> Result<()>;
}

fn already_exists(username: &str) -> WicketError {
    WicketError::Conflict(format!("Account {} already exists", username))
}

fn no_such_account(username: &str) -> WicketError {
    WicketError::NotFound(format!("Account {} not found", username))
}

// =============================================================================
// In-memory implementation
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    accounts: DashMap<String, Account>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, username: &str) -> Result<Option<Account>> {
        Ok(self.accounts.get(username).map(|a| a.value().clone()))
    }

    async fn insert(&self, account: Account) -> Result<()> {
        match self.accounts.entry(account.username.clone()) {
            Entry::Occupied(_) => Err(already_exists(&account.username)),
            Entry::Vacant(slot) => {
                slot.insert(account);
                Ok(())
            }
        }
    }

    async fn update_password(&self, username: &str, pw_hash: String) -> Result<()> {
        match self.accounts.get_mut(username) {
            Some(mut account) => {
                account.pw_hash = pw_hash;
                Ok(())
            }
            None => Err(no_such_account(username)),
        }
    }

    async fn delete(&self, username: &str) -> Result<()> {
        self.accounts
            .remove(username)
            .map(|_| ())
            .ok_or_else(|| no_such_account(username))
    }
}

// =============================================================================
// MongoDB implementation
// =============================================================================

pub struct MongoCredentialStore {
    collection: MongoCollection<AccountDoc>,
}

impl MongoCredentialStore {
    pub async fn new(mongo: &MongoClient) -> Result<Self> {
        let collection = mongo.collection::<AccountDoc>(ACCOUNT_COLLECTION).await?;
        Ok(Self { collection })
    }
}

#[async_trait]
impl CredentialStore for MongoCredentialStore {
    async fn get(&self, username: &str) -> Result<Option<Account>> {
        let found = self
            .collection
            .find_one(doc! { "username": username })
            .await?;
        Ok(found.map(Account::from))
    }

    async fn insert(&self, account: Account) -> Result<()> {
        let username = account.username.clone();
        match self.collection.insert_one(AccountDoc::from(account)).await {
            Err(WicketError::Conflict(e)) => {
                debug!("Duplicate account insert: {}", e);
                Err(already_exists(&username))
            }
            other => other,
        }
    }

    async fn update_password(&self, username: &str, pw_hash: String) -> Result<()> {
        let result = self
            .collection
            .update_one(
                doc! { "username": username },
                doc! {
                    "$set": {
                        "pw_hash": pw_hash,
                        "metadata.updated_at": DateTime::now()
                    }
                },
            )
            .await?;

        if result.matched_count == 0 {
            return Err(no_such_account(username));
        }
        Ok(())
    }

    async fn delete(&self, username: &str) -> Result<()> {
        let result = self
            .collection
            .delete_one(doc! { "username": username })
            .await?;

        if result.deleted_count == 0 {
            return Err(no_such_account(username));
        }
        Ok(())
    }
}
