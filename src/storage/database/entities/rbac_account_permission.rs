use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Explicit grant or deny of a permission for an account
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "rbac_account_permissions")]
pub struct Model {
    /// Account ID
    #[sea_orm(primary_key, auto_increment = false)]
    pub account_id: i64,

    /// Permission ID
    #[sea_orm(primary_key, auto_increment = false)]
    pub permission_id: i64,

    /// Realm ID, -1 for every realm
    #[sea_orm(primary_key, auto_increment = false)]
    pub realm_id: i32,

    /// Grant when true, deny when false
    pub granted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
