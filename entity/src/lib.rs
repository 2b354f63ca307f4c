pub mod account_resource_groups;
pub mod accounts;
pub mod resource_groups;
