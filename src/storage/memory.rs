//! In-memory permission store

use crate::auth::rbac::{
    ALL_REALMS, AccountId, PermissionId, PermissionStore, RealmId, RealmScope, StoredPermission,
};
use crate::utils::error::{RbacError, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

type RowKey = (AccountId, PermissionId, i32);

/// Permission store kept in a concurrent map; nothing survives the process
#[derive(Debug, Default)]
pub struct MemoryPermissionStore {
    rows: DashMap<RowKey, bool>,
}

impl MemoryPermissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows across all accounts
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Stored row for (account, permission, realm), if any
    pub fn row(
        &self,
        account_id: AccountId,
        permission_id: PermissionId,
        realm: RealmScope,
    ) -> Option<bool> {
        self.rows
            .get(&(account_id, permission_id, realm.to_storage()))
            .map(|entry| *entry.value())
    }
}

#[async_trait]
impl PermissionStore for MemoryPermissionStore {
    async fn query_explicit_permissions(
        &self,
        account_id: AccountId,
        realm_id: RealmId,
    ) -> Result<Vec<StoredPermission>> {
        let realm = i32::try_from(realm_id)
            .map_err(|_| RbacError::validation(format!("Realm id {} out of range", realm_id)))?;

        let mut rows: Vec<_> = self
            .rows
            .iter()
            .filter(|entry| {
                let (account, _, row_realm) = *entry.key();
                account == account_id && (row_realm == realm || row_realm == ALL_REALMS)
            })
            .filter_map(|entry| {
                let (_, permission_id, row_realm) = *entry.key();
                RealmScope::from_storage(row_realm).map(|realm| StoredPermission {
                    permission_id,
                    granted: *entry.value(),
                    realm,
                })
            })
            .collect();

        rows.sort_unstable_by_key(|row| (row.permission_id, row.realm.to_storage()));
        debug!(
            "Memory store returned {} rows for account {} in realm {}",
            rows.len(),
            account_id,
            realm_id
        );
        Ok(rows)
    }

    async fn upsert_permission(
        &self,
        account_id: AccountId,
        permission_id: PermissionId,
        granted: bool,
        realm: RealmScope,
    ) -> Result<()> {
        self.rows
            .insert((account_id, permission_id, realm.to_storage()), granted);
        Ok(())
    }

    async fn delete_permission(
        &self,
        account_id: AccountId,
        permission_id: PermissionId,
        realm: RealmScope,
    ) -> Result<()> {
        self.rows
            .remove(&(account_id, permission_id, realm.to_storage()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_query_orders_and_filters_rows() {
        let store = MemoryPermissionStore::new();
        store
            .upsert_permission(1, 20, true, RealmScope::Specific(2))
            .await
            .unwrap();
        store
            .upsert_permission(1, 10, false, RealmScope::Specific(1))
            .await
            .unwrap();
        store
            .upsert_permission(1, 10, true, RealmScope::Global)
            .await
            .unwrap();
        store
            .upsert_permission(2, 10, true, RealmScope::Global)
            .await
            .unwrap();

        let rows = store.query_explicit_permissions(1, 1).await.unwrap();
        assert_eq!(
            rows,
            vec![
                StoredPermission {
                    permission_id: 10,
                    granted: true,
                    realm: RealmScope::Global,
                },
                StoredPermission {
                    permission_id: 10,
                    granted: false,
                    realm: RealmScope::Specific(1),
                },
            ]
        );
        assert_eq!(store.len(), 4);
    }

    #[tokio::test]
    async fn test_upsert_overwrites_and_delete_removes() {
        let store = MemoryPermissionStore::new();
        store
            .upsert_permission(1, 5, true, RealmScope::Global)
            .await
            .unwrap();
        store
            .upsert_permission(1, 5, false, RealmScope::Global)
            .await
            .unwrap();
        assert_eq!(store.row(1, 5, RealmScope::Global), Some(false));
        assert_eq!(store.len(), 1);

        store
            .delete_permission(1, 5, RealmScope::Global)
            .await
            .unwrap();
        assert!(store.is_empty());
    }
}
