pub mod register_account_usecase;
pub mod uniqueness_precheck;
