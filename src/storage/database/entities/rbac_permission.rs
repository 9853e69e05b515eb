use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Permission definition
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "rbac_permissions")]
pub struct Model {
    /// Permission ID
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,

    /// Permission name
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
