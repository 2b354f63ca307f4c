use async_trait::async_trait;

use crate::domain::{
    error::RepositoryError,
    models::account::{Account, EmailAddress},
};

/// Read side of the directory, used by the uniqueness precheck.
#[async_trait]
pub trait AccountRepository {
    async fn find_by_email(&self, email: &EmailAddress)
    -> Result<Option<Account>, RepositoryError>;
}
