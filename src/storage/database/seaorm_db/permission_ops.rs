use crate::auth::rbac::{
    ALL_REALMS, AccountId, PermissionId, PermissionStore, RealmId, RealmScope, StoredPermission,
};
use crate::utils::error::{RbacError, Result};
use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::{debug, warn};

use super::super::entities::{self, rbac_account_permission};
use super::types::SeaOrmDatabase;

impl SeaOrmDatabase {
    /// Every explicit row of an account, across all realms
    pub async fn list_account_permissions(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<rbac_account_permission::Model>> {
        entities::RbacAccountPermission::find()
            .filter(rbac_account_permission::Column::AccountId.eq(i64::from(account_id)))
            .order_by_asc(rbac_account_permission::Column::PermissionId)
            .order_by_asc(rbac_account_permission::Column::RealmId)
            .all(&self.db)
            .await
            .map_err(RbacError::Database)
    }
}

#[async_trait]
impl PermissionStore for SeaOrmDatabase {
    async fn query_explicit_permissions(
        &self,
        account_id: AccountId,
        realm_id: RealmId,
    ) -> Result<Vec<StoredPermission>> {
        debug!(
            "Querying explicit permissions for account {} in realm {}",
            account_id, realm_id
        );

        let realm = i32::try_from(realm_id)
            .map_err(|_| RbacError::validation(format!("Realm id {} out of range", realm_id)))?;

        let rows = entities::RbacAccountPermission::find()
            .filter(rbac_account_permission::Column::AccountId.eq(i64::from(account_id)))
            .filter(
                Condition::any()
                    .add(rbac_account_permission::Column::RealmId.eq(realm))
                    .add(rbac_account_permission::Column::RealmId.eq(ALL_REALMS)),
            )
            .order_by_asc(rbac_account_permission::Column::PermissionId)
            .order_by_asc(rbac_account_permission::Column::RealmId)
            .all(&self.db)
            .await
            .map_err(RbacError::Database)?;

        let mut permissions = Vec::with_capacity(rows.len());
        for row in rows {
            let (Ok(permission_id), Some(realm)) = (
                PermissionId::try_from(row.permission_id),
                RealmScope::from_storage(row.realm_id),
            ) else {
                warn!(
                    "Skipping malformed permission row (account {}, permission {}, realm {})",
                    row.account_id, row.permission_id, row.realm_id
                );
                continue;
            };
            permissions.push(StoredPermission {
                permission_id,
                granted: row.granted,
                realm,
            });
        }

        Ok(permissions)
    }

    async fn upsert_permission(
        &self,
        account_id: AccountId,
        permission_id: PermissionId,
        granted: bool,
        realm: RealmScope,
    ) -> Result<()> {
        debug!(
            "Saving permission {} (granted: {}) for account {} in {}",
            permission_id, granted, account_id, realm
        );

        let active_model = rbac_account_permission::ActiveModel {
            account_id: Set(i64::from(account_id)),
            permission_id: Set(i64::from(permission_id)),
            realm_id: Set(realm.to_storage()),
            granted: Set(granted),
        };

        entities::RbacAccountPermission::insert(active_model)
            .on_conflict(
                OnConflict::columns([
                    rbac_account_permission::Column::AccountId,
                    rbac_account_permission::Column::PermissionId,
                    rbac_account_permission::Column::RealmId,
                ])
                .update_column(rbac_account_permission::Column::Granted)
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(RbacError::Database)?;

        Ok(())
    }

    async fn delete_permission(
        &self,
        account_id: AccountId,
        permission_id: PermissionId,
        realm: RealmScope,
    ) -> Result<()> {
        debug!(
            "Deleting permission {} for account {} in {}",
            permission_id, account_id, realm
        );

        entities::RbacAccountPermission::delete_many()
            .filter(rbac_account_permission::Column::AccountId.eq(i64::from(account_id)))
            .filter(rbac_account_permission::Column::PermissionId.eq(i64::from(permission_id)))
            .filter(rbac_account_permission::Column::RealmId.eq(realm.to_storage()))
            .exec(&self.db)
            .await
            .map_err(RbacError::Database)?;

        Ok(())
    }
}
