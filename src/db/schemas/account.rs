//! Account document schema
//!
//! Stores credentials and the admin flag, keyed by username.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;
use crate::db::Account;

/// Collection name for accounts
pub const ACCOUNT_COLLECTION: &str = "accounts";

/// Account document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct AccountDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at)
    #[serde(default)]
    pub metadata: Metadata,

    /// Login name, unique and case-sensitive
    pub username: String,

    /// Argon2 password hash (PHC string)
    pub pw_hash: String,

    #[serde(default)]
    pub is_admin: bool,
}

impl From<Account> for AccountDoc {
    fn from(account: Account) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            username: account.username,
            pw_hash: account.pw_hash,
            is_admin: account.is_admin,
        }
    }
}

impl From<AccountDoc> for Account {
    fn from(doc: AccountDoc) -> Self {
        Self {
            username: doc.username,
            pw_hash: doc.pw_hash,
            is_admin: doc.is_admin,
        }
    }
}

impl IntoIndexes for AccountDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "username": 1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("username_unique".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for AccountDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_admin_flag_defaults_false() {
        let doc: AccountDoc = bson::from_document(doc! {
            "username": "alice",
            "pw_hash": "$argon2id$x",
        })
        .unwrap();

        let account = Account::from(doc);
        assert_eq!(account.username, "alice");
        assert!(!account.is_admin);
    }

    #[test]
    fn test_doc_has_no_id_until_inserted() {
        let doc = AccountDoc::from(Account {
            username: "alice".into(),
            pw_hash: "h".into(),
            is_admin: true,
        });
        assert!(doc._id.is_none());

        let raw = bson::to_document(&doc).unwrap();
        assert!(!raw.contains_key("_id"));
        assert!(raw.get_bool("is_admin").unwrap());
    }
}
