pub mod account;
pub mod credential;
pub mod identity;
pub mod registration;
pub mod resource_group;
