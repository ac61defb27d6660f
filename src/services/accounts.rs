//! Account administration
//!
//! Every operation reachable over HTTP requires an admin caller. There is no
//! self-service path, not even for changing one's own password.
//! [`AccountAdmin::provision`] skips the admin gate and is only meant for
//! operator tooling that already has direct database access.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{is_guest, require_admin, spawn_hash, Identity};
use crate::db::{Account, CredentialStore};
use crate::services::NOT_FOUND_DETAIL;
use crate::types::{Result, WicketError};

pub const EMPTY_USERNAME: &str = "계정명이 비어 있음";
pub const GUEST_NAME_RESERVED: &str = "계정명은 'guest_'로 시작할 수 없음";
pub const CREATE_WITHOUT_PASSWORD: &str = "계정을 만드는데 비밀번호를 안 알려주면 뭐 어쩌자는거죠";
pub const CHANGE_WITHOUT_PASSWORD: &str =
    "비밀번호를 바꾸는데 비밀번호를 안 알려주면 뭐 어쩌자는거죠";
pub const ALREADY_EXISTS: &str = "이미 계정 있음";

pub const CREATED: &str = "계정 생성 완료";
pub const PASSWORD_CHANGED: &str = "비밀번호 변경 완료";
pub const DELETED: &str = "계정 삭제 완료";

/// Body of the account administration endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountRequest {
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

/// `{"detail": ...}` success body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailResponse {
    pub detail: String,
}

impl DetailResponse {
    fn new(detail: &str) -> Self {
        Self {
            detail: detail.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct AccountAdmin {
    store: Arc<dyn CredentialStore>,
}

impl AccountAdmin {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Create an account without checking who is asking
    pub async fn provision(
        &self,
        username: &str,
        password: Option<&str>,
        is_admin: bool,
    ) -> Result<()> {
        if username.is_empty() {
            return Err(WicketError::BadRequest(EMPTY_USERNAME.into()));
        }
        if is_guest(username) {
            return Err(WicketError::Forbidden(GUEST_NAME_RESERVED.into()));
        }
        let Some(password) = password else {
            return Err(WicketError::Forbidden(CREATE_WITHOUT_PASSWORD.into()));
        };
        if self.store.get(username).await?.is_some() {
            return Err(WicketError::Conflict(ALREADY_EXISTS.into()));
        }

        let pw_hash = spawn_hash(password.to_string()).await?;
        let account = Account {
            username: username.to_string(),
            pw_hash,
            is_admin,
        };

        // lost a race with a concurrent create
        self.store.insert(account).await.map_err(|e| match e {
            WicketError::Conflict(_) => WicketError::Conflict(ALREADY_EXISTS.into()),
            other => other,
        })
    }

    pub async fn create(&self, caller: &Identity, req: &AccountRequest) -> Result<DetailResponse> {
        require_admin(caller)?;
        self.provision(&req.username, req.password.as_deref(), req.is_admin)
            .await?;

        info!(
            "{} created account {} (admin: {})",
            caller.username, req.username, req.is_admin
        );
        Ok(DetailResponse::new(CREATED))
    }

    pub async fn change_password(
        &self,
        caller: &Identity,
        req: &AccountRequest,
    ) -> Result<DetailResponse> {
        require_admin(caller)?;
        let Some(password) = req.password.as_deref() else {
            return Err(WicketError::Forbidden(CHANGE_WITHOUT_PASSWORD.into()));
        };

        let pw_hash = spawn_hash(password.to_string()).await?;
        self.store
            .update_password(&req.username, pw_hash)
            .await
            .map_err(not_found_detail)?;

        info!("{} changed password of {}", caller.username, req.username);
        Ok(DetailResponse::new(PASSWORD_CHANGED))
    }

    pub async fn delete(&self, caller: &Identity, username: &str) -> Result<DetailResponse> {
        require_admin(caller)?;
        self.store.delete(username).await.map_err(not_found_detail)?;

        info!("{} deleted account {}", caller.username, username);
        Ok(DetailResponse::new(DELETED))
    }
}

fn not_found_detail(err: WicketError) -> WicketError {
    match err {
        WicketError::NotFound(_) => WicketError::NotFound(NOT_FOUND_DETAIL.into()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::authorizer::NO_PERMISSION;
    use crate::auth::verify_password;
    use crate::db::MemoryCredentialStore;

    fn setup() -> (AccountAdmin, Arc<MemoryCredentialStore>) {
        let store = Arc::new(MemoryCredentialStore::new());
        (AccountAdmin::new(store.clone()), store)
    }

    fn admin() -> Identity {
        Identity {
            username: "root".into(),
            is_admin: true,
        }
    }

    fn request(username: &str, password: Option<&str>) -> AccountRequest {
        AccountRequest {
            username: username.into(),
            password: password.map(String::from),
            is_admin: false,
        }
    }

    #[tokio::test]
    async fn test_create() {
        let (admin_svc, store) = setup();
        let resp = admin_svc
            .create(&admin(), &request("alice", Some("pw")))
            .await
            .unwrap();
        assert_eq!(resp.detail, CREATED);

        let stored = store.get("alice").await.unwrap().unwrap();
        assert!(!stored.is_admin);
        assert_ne!(stored.pw_hash, "pw");
        assert!(verify_password("pw", &stored.pw_hash));
    }

    #[tokio::test]
    async fn test_create_admin_flag() {
        let (admin_svc, store) = setup();
        let req = AccountRequest {
            is_admin: true,
            ..request("ops", Some("pw"))
        };
        admin_svc.create(&admin(), &req).await.unwrap();
        assert!(store.get("ops").await.unwrap().unwrap().is_admin);
    }

    #[tokio::test]
    async fn test_create_rejections() {
        let (admin_svc, _) = setup();

        let err = admin_svc
            .create(&admin(), &request("guest_x", Some("pw")))
            .await
            .unwrap_err();
        assert!(matches!(err, WicketError::Forbidden(ref m) if m == GUEST_NAME_RESERVED));

        let err = admin_svc
            .create(&admin(), &request("alice", None))
            .await
            .unwrap_err();
        assert!(matches!(err, WicketError::Forbidden(ref m) if m == CREATE_WITHOUT_PASSWORD));

        let err = admin_svc
            .create(&admin(), &request("", Some("pw")))
            .await
            .unwrap_err();
        assert!(matches!(err, WicketError::BadRequest(_)));

        admin_svc
            .create(&admin(), &request("alice", Some("pw")))
            .await
            .unwrap();
        let err = admin_svc
            .create(&admin(), &request("alice", Some("other")))
            .await
            .unwrap_err();
        assert!(matches!(err, WicketError::Conflict(ref m) if m == ALREADY_EXISTS));
    }

    #[tokio::test]
    async fn test_guest_prefix_rejected_even_when_provisioning() {
        let (admin_svc, _) = setup();
        assert!(matches!(
            admin_svc.provision("guest_root", Some("pw"), true).await,
            Err(WicketError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_non_admin_forbidden_even_for_self() {
        let (admin_svc, _) = setup();
        admin_svc.provision("alice", Some("pw"), false).await.unwrap();
        let alice = Identity {
            username: "alice".into(),
            is_admin: false,
        };

        let change = admin_svc
            .change_password(&alice, &request("alice", Some("new")))
            .await
            .unwrap_err();
        let delete = admin_svc.delete(&alice, "alice").await.unwrap_err();
        let create = admin_svc
            .create(&alice, &request("bob", Some("pw")))
            .await
            .unwrap_err();

        for err in [change, delete, create] {
            assert!(matches!(err, WicketError::Forbidden(ref m) if m == NO_PERMISSION));
        }
    }

    #[tokio::test]
    async fn test_change_password() {
        let (admin_svc, store) = setup();
        admin_svc.provision("alice", Some("old"), false).await.unwrap();

        let resp = admin_svc
            .change_password(&admin(), &request("alice", Some("new")))
            .await
            .unwrap();
        assert_eq!(resp.detail, PASSWORD_CHANGED);

        let stored = store.get("alice").await.unwrap().unwrap();
        assert!(verify_password("new", &stored.pw_hash));
        assert!(!verify_password("old", &stored.pw_hash));

        let err = admin_svc
            .change_password(&admin(), &request("alice", None))
            .await
            .unwrap_err();
        assert!(matches!(err, WicketError::Forbidden(ref m) if m == CHANGE_WITHOUT_PASSWORD));

        let err = admin_svc
            .change_password(&admin(), &request("nobody", Some("x")))
            .await
            .unwrap_err();
        assert!(matches!(err, WicketError::NotFound(ref m) if m == NOT_FOUND_DETAIL));
    }

    #[tokio::test]
    async fn test_delete() {
        let (admin_svc, store) = setup();
        admin_svc.provision("alice", Some("pw"), false).await.unwrap();

        let resp = admin_svc.delete(&admin(), "alice").await.unwrap();
        assert_eq!(resp.detail, DELETED);
        assert!(store.is_empty());

        let err = admin_svc.delete(&admin(), "alice").await.unwrap_err();
        assert!(matches!(err, WicketError::NotFound(ref m) if m == NOT_FOUND_DETAIL));
    }

    #[test]
    fn test_request_defaults() {
        let req: AccountRequest = serde_json::from_str(r#"{"username":"alice"}"#).unwrap();
        assert_eq!(req.password, None);
        assert!(!req.is_admin);
    }
}
