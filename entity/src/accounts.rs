use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Handle of the principal in the external identity service.
    /// This is a foreign reference, not an ownership relation.
    #[sea_orm(unique)]
    pub identity_handle: String,

    /// External identifier; the unique index is the local backstop for
    /// the precheck/creation race.
    #[sea_orm(unique)]
    pub email: String,

    pub role: String,
    pub display_name: String,
    pub password_hash: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
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
