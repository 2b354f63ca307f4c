use async_trait::async_trait;

use crate::domain::{
    error::RepositoryError,
    models::{
        account::Account, credential::HashedPassword, identity::Identity,
        resource_group::ResourceGroup,
    },
};

/// Records created by one provisioning transaction.
#[derive(Debug, Clone)]
pub struct ProvisionedRecords {
    pub account: Account,
    pub resource_group: Option<ResourceGroup>,
}

/// Relational unit of work: creates the account and, for roles that own
/// one, the resource group and link record in a single transaction.
/// Any failure rolls the whole transaction back; no partial records are
/// ever visible. No internal retry.
#[async_trait]
pub trait ProvisioningRepository {
    async fn create_account_with_resources(
        &self,
        identity: &Identity,
        display_name: &str,
        password_hash: HashedPassword,
    ) -> Result<ProvisionedRecords, RepositoryError>;
}
