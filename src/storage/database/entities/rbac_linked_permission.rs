use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Link from a permission to a permission it implies
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "rbac_linked_permissions")]
pub struct Model {
    /// Parent permission ID
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,

    /// Implied permission ID
    #[sea_orm(primary_key, auto_increment = false)]
    pub linked_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
