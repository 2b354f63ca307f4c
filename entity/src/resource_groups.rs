use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "resource_groups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub name: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::account_resource_groups::Entity")]
    AccountResourceGroups,
}

impl Related<super::account_resource_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountResourceGroups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
