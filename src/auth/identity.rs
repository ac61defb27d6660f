//! Authenticated identities
//!
//! An [`Identity`] is derived per request and never persisted. Usernames
//! beginning with [`GUEST_PREFIX`] form a reserved namespace: they are never
//! backed by an account and are never admins.

use serde::{Deserialize, Serialize};

use crate::db::Account;

/// Reserved prefix for guest usernames
pub const GUEST_PREFIX: &str = "guest_";

/// Whether `username` lies in the guest namespace
pub fn is_guest(username: &str) -> bool {
    username.starts_with(GUEST_PREFIX)
}

/// Who is making the request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub is_admin: bool,
}

impl Identity {
    /// Guest identity; never an admin
    pub fn guest(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            is_admin: false,
        }
    }

    /// Identity backed by a stored account, with the account's current role
    pub fn registered(account: &Account) -> Self {
        Self {
            username: account.username.clone(),
            is_admin: account.is_admin,
        }
    }

    pub fn is_guest(&self) -> bool {
        is_guest(&self.username)
    }
}
