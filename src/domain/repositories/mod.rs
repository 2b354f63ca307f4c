pub mod account_repository;
pub mod provisioning_repository;
