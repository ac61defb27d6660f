//! Authorization checks over an already-authenticated identity

use crate::auth::identity::Identity;
use crate::types::{Result, WicketError};

pub const NO_PERMISSION: &str = "권한 없음";
pub const MISSING_TARGET: &str = "비교 대상 사용자명이 없음";

/// What a caller wants to act on
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    Username(&'a str),
    Identity(&'a Identity),
}

impl<'a> From<&'a str> for Target<'a> {
    fn from(username: &'a str) -> Self {
        Target::Username(username)
    }
}

impl<'a> From<&'a String> for Target<'a> {
    fn from(username: &'a String) -> Self {
        Target::Username(username)
    }
}

impl<'a> From<&'a Identity> for Target<'a> {
    fn from(identity: &'a Identity) -> Self {
        Target::Identity(identity)
    }
}

/// Pass only admins
pub fn require_admin(identity: &Identity) -> Result<&Identity> {
    if !identity.is_admin {
        return Err(WicketError::Forbidden(NO_PERMISSION.into()));
    }
    Ok(identity)
}

/// Pass admins and the target itself
pub fn require_self_or_admin<'a, 't>(
    identity: &'a Identity,
    target: impl Into<Target<'t>>,
) -> Result<&'a Identity> {
    let target = match target.into() {
        Target::Username(name) => name,
        Target::Identity(other) if other.username.is_empty() => {
            return Err(WicketError::BadRequest(MISSING_TARGET.into()));
        }
        Target::Identity(other) => other.username.as_str(),
    };

    if !identity.is_admin && identity.username != target {
        return Err(WicketError::Forbidden(NO_PERMISSION.into()));
    }
    Ok(identity)
}
