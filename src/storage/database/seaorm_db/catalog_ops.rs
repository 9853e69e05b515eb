use crate::auth::rbac::{
    ALL_REALMS, CatalogSource, PermissionId, RbacCatalog, RealmId, RealmScope, SecurityLevel,
};
use crate::utils::error::{RbacError, Result};
use async_trait::async_trait;
use sea_orm::*;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::super::entities::{
    self, rbac_default_permission, rbac_linked_permission, rbac_permission,
};
use super::types::SeaOrmDatabase;

impl SeaOrmDatabase {
    /// Build the catalog from the `rbac_*` tables
    ///
    /// Only default permissions of `realm_id` and of every realm (-1) are
    /// taken. Rows with ids out of range are reported and skipped.
    pub async fn load_rbac_catalog(&self, realm_id: RealmId) -> Result<RbacCatalog> {
        debug!("Loading RBAC catalog for realm {}", realm_id);
        let realm = i32::try_from(realm_id)
            .map_err(|_| RbacError::validation(format!("Realm id {} out of range", realm_id)))?;

        let permissions = entities::RbacPermission::find()
            .order_by_asc(rbac_permission::Column::Id)
            .all(&self.db)
            .await?;
        let links = entities::RbacLinkedPermission::find()
            .order_by_asc(rbac_linked_permission::Column::Id)
            .all(&self.db)
            .await?;
        let defaults = entities::RbacDefaultPermission::find()
            .filter(
                Condition::any()
                    .add(rbac_default_permission::Column::RealmId.eq(realm))
                    .add(rbac_default_permission::Column::RealmId.eq(ALL_REALMS)),
            )
            .order_by_asc(rbac_default_permission::Column::SecLevel)
            .all(&self.db)
            .await?;

        let mut builder = RbacCatalog::builder();
        for row in permissions {
            match PermissionId::try_from(row.id) {
                Ok(id) => {
                    builder.permission(id, row.name)?;
                }
                Err(_) => warn!("Skipping permission with out of range id {}", row.id),
            }
        }
        for row in links {
            match (PermissionId::try_from(row.id), PermissionId::try_from(row.linked_id)) {
                (Ok(id), Ok(linked_id)) => {
                    builder.link(id, linked_id);
                }
                _ => warn!(
                    "Skipping linked permission with out of range ids ({}, {})",
                    row.id, row.linked_id
                ),
            }
        }
        for row in defaults {
            let level = u8::try_from(row.sec_level)
                .ok()
                .and_then(|value| SecurityLevel::try_from(value).ok());
            match (level, PermissionId::try_from(row.permission_id)) {
                (Some(level), Ok(id)) => {
                    builder.default_permission(level, id);
                }
                _ => warn!(
                    "Skipping default permission {} with unknown security level {}",
                    row.permission_id, row.sec_level
                ),
            }
        }

        Ok(builder.build())
    }

    /// Replace the catalog tables with `catalog`
    ///
    /// Defaults are written with `realm` as their scope. Runs in a single
    /// transaction; account rows are left untouched.
    pub async fn import_rbac_catalog(&self, catalog: &RbacCatalog, realm: RealmScope) -> Result<()> {
        if !realm.is_valid() {
            return Err(RbacError::validation(format!("Invalid realm scope: {}", realm)));
        }
        info!(
            "Importing {} permissions and {} default permissions",
            catalog.permissions.len(),
            catalog.defaults.len()
        );

        let txn = self.db.begin().await?;

        entities::RbacDefaultPermission::delete_many().exec(&txn).await?;
        entities::RbacLinkedPermission::delete_many().exec(&txn).await?;
        entities::RbacPermission::delete_many().exec(&txn).await?;

        for permission in catalog.permissions.sorted() {
            entities::RbacPermission::insert(rbac_permission::ActiveModel {
                id: Set(i64::from(permission.id)),
                name: Set(permission.name.clone()),
            })
            .exec_without_returning(&txn)
            .await?;

            for linked_id in permission.sorted_links() {
                entities::RbacLinkedPermission::insert(rbac_linked_permission::ActiveModel {
                    id: Set(i64::from(permission.id)),
                    linked_id: Set(i64::from(linked_id)),
                })
                .exec_without_returning(&txn)
                .await?;
            }
        }

        for (level, ids) in catalog.defaults.sorted() {
            for id in ids {
                entities::RbacDefaultPermission::insert(rbac_default_permission::ActiveModel {
                    sec_level: Set(i32::from(level.as_u8())),
                    permission_id: Set(i64::from(id)),
                    realm_id: Set(realm.to_storage()),
                })
                .exec_without_returning(&txn)
                .await?;
            }
        }

        txn.commit().await?;
        info!("RBAC catalog import committed");
        Ok(())
    }
}

/// Catalog read from the database tables of the current realm
#[derive(Debug, Clone)]
pub struct DatabaseCatalogSource {
    db: Arc<SeaOrmDatabase>,
    realm_id: RealmId,
}

impl DatabaseCatalogSource {
    pub fn new(db: Arc<SeaOrmDatabase>, realm_id: RealmId) -> Self {
        Self { db, realm_id }
    }
}

#[async_trait]
impl CatalogSource for DatabaseCatalogSource {
    async fn load(&self) -> Result<RbacCatalog> {
        self.db.load_rbac_catalog(self.realm_id).await
    }

    fn describe(&self) -> String {
        format!("database (realm {})", self.realm_id)
    }
}
