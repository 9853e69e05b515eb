//! Persistence boundary for explicit account permissions

use crate::utils::error::Result;
use async_trait::async_trait;

use super::types::{AccountId, PermissionId, RealmId, RealmScope};

/// One explicit grant or deny row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredPermission {
    pub permission_id: PermissionId,
    pub granted: bool,
    pub realm: RealmScope,
}

/// Durable record of per-account grant and deny rows
///
/// Each call completes or fails on its own; the engine never composes several
/// calls into one transaction.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Rows of `account_id` visible from `realm_id` (its own rows and global
    /// ones), ordered by permission id, then realm
    async fn query_explicit_permissions(
        &self,
        account_id: AccountId,
        realm_id: RealmId,
    ) -> Result<Vec<StoredPermission>>;

    /// Insert or overwrite the row keyed by (account, permission, realm)
    async fn upsert_permission(
        &self,
        account_id: AccountId,
        permission_id: PermissionId,
        granted: bool,
        realm: RealmScope,
    ) -> Result<()>;

    /// Remove the row keyed by (account, permission, realm), if any
    async fn delete_permission(
        &self,
        account_id: AccountId,
        permission_id: PermissionId,
        realm: RealmScope,
    ) -> Result<()>;
}
