use std::time::Duration;

use async_trait::async_trait;
use entity::accounts;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::domain::{
    error::RepositoryError,
    models::{
        account::{Account, AccountId, EmailAddress, Role},
        credential::HashedPassword,
        identity::IdentityHandle,
    },
    repositories::account_repository::AccountRepository,
};

#[derive(Clone)]
pub struct PostgresAccountRepository {
    db: DatabaseConnection,
    timeout: Duration,
}

impl PostgresAccountRepository {
    pub fn new(db: DatabaseConnection, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    async fn lookup(&self, email: &EmailAddress) -> Result<Option<Account>, RepositoryError> {
        let account = accounts::Entity::find()
            .filter(accounts::Column::Email.eq(email.as_str()))
            .one(&self.db)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        match account {
            Some(model) => Ok(Some(account_from_model(model)?)),
            None => Ok(None),
        }
    }
}

fn account_from_model(model: accounts::Model) -> Result<Account, RepositoryError> {
    let email = EmailAddress::new(model.email).ok_or_else(|| {
        RepositoryError::DatabaseError("stored email is not an address".to_string())
    })?;
    let role = Role::parse(&model.role)
        .ok_or_else(|| RepositoryError::DatabaseError("stored role is unknown".to_string()))?;

    Ok(Account::new(
        AccountId::from_uuid(model.id),
        IdentityHandle::new(model.identity_handle),
        email,
        role,
        model.display_name,
        HashedPassword::new(model.password_hash),
    ))
}

/// Caps a relational lookup at `limit`; a stalled connection surfaces as
/// `Timeout` instead of holding the caller indefinitely.
async fn bounded<T, F>(limit: Duration, lookup: F) -> Result<T, RepositoryError>
where
    F: std::future::Future<Output = Result<T, RepositoryError>>,
{
    tokio::time::timeout(limit, lookup)
        .await
        .map_err(|_| RepositoryError::Timeout)?
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Account>, RepositoryError> {
        bounded(self.timeout, self.lookup(email)).await
    }
}
