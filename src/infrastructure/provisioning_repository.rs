use std::time::Duration;

use async_trait::async_trait;
use sea_orm::{ActiveValue::Set, DatabaseConnection, DbErr, EntityTrait, SqlErr, TransactionTrait};
use uuid::Uuid;

use crate::domain::{
    error::RepositoryError,
    models::{
        account::{Account, AccountId},
        credential::HashedPassword,
        identity::Identity,
        resource_group::{ResourceGroup, ResourceGroupId},
    },
    repositories::provisioning_repository::{ProvisionedRecords, ProvisioningRepository},
};
use entity::{account_resource_groups, accounts, resource_groups};

#[derive(Clone)]
pub struct PostgresProvisioningRepository {
    db: DatabaseConnection,
    timeout: Duration,
}

impl PostgresProvisioningRepository {
    pub fn new(db: DatabaseConnection, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    async fn run_transaction(
        &self,
        identity: &Identity,
        display_name: &str,
        password_hash: &HashedPassword,
    ) -> Result<ProvisionedRecords, RepositoryError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let account_id = Uuid::new_v4();
        let now = chrono::Utc::now().fixed_offset();

        let account_model = accounts::ActiveModel {
            id: Set(account_id),
            identity_handle: Set(identity.handle().as_str().to_string()),
            email: Set(identity.email().as_str().to_string()),
            role: Set(identity.role().as_str().to_string()),
            display_name: Set(display_name.to_string()),
            password_hash: Set(password_hash.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        accounts::Entity::insert(account_model)
            .exec(&txn)
            .await
            .map_err(map_db_err)?;

        // Resource group and link only for roles that own one; the link
        // goes last because it needs both generated keys.
        let resource_group = if identity.role().owns_resource_group() {
            let group_id = Uuid::new_v4();
            let group_name = ResourceGroup::name_for(display_name);

            let group_model = resource_groups::ActiveModel {
                id: Set(group_id),
                name: Set(group_name.clone()),
                created_at: Set(now),
            };
            resource_groups::Entity::insert(group_model)
                .exec(&txn)
                .await
                .map_err(map_db_err)?;

            let link_model = account_resource_groups::ActiveModel {
                account_id: Set(account_id),
                resource_group_id: Set(group_id),
            };
            account_resource_groups::Entity::insert(link_model)
                .exec(&txn)
                .await
                .map_err(map_db_err)?;

            Some(ResourceGroup::new(
                ResourceGroupId::from_uuid(group_id),
                group_name,
            ))
        } else {
            None
        };

        // Dropping the transaction without this rolls everything back.
        txn.commit().await.map_err(map_db_err)?;

        let account = Account::new(
            AccountId::from_uuid(account_id),
            identity.handle().clone(),
            identity.email().clone(),
            identity.role(),
            display_name.to_string(),
            password_hash.clone(),
        );

        Ok(ProvisionedRecords {
            account,
            resource_group,
        })
    }
}

fn map_db_err(err: DbErr) -> RepositoryError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => RepositoryError::UniqueViolation,
        _ => RepositoryError::DatabaseError(err.to_string()),
    }
}

#[async_trait]
impl ProvisioningRepository for PostgresProvisioningRepository {
    async fn create_account_with_resources(
        &self,
        identity: &Identity,
        display_name: &str,
        password_hash: HashedPassword,
    ) -> Result<ProvisionedRecords, RepositoryError> {
        // An elapsed timeout leaves the transaction uncommitted; the
        // connection drop rolls it back and the caller compensates.
        tokio::time::timeout(
            self.timeout,
            self.run_transaction(identity, display_name, &password_hash),
        )
        .await
        .map_err(|_| RepositoryError::Timeout)?
    }
}
