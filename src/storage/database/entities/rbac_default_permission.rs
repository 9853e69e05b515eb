use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Permission granted by default to a security level
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "rbac_default_permissions")]
pub struct Model {
    /// Security level (0 = player .. 4 = console)
    #[sea_orm(primary_key, auto_increment = false)]
    pub sec_level: i32,

    /// Permission ID
    #[sea_orm(primary_key, auto_increment = false)]
    pub permission_id: i64,

    /// Realm ID, -1 for every realm
    #[sea_orm(primary_key, auto_increment = false)]
    pub realm_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
