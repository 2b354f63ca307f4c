pub mod account_repository;
pub mod argon2_password_hasher;
pub mod http_identity_provider;
pub mod provisioning_repository;
