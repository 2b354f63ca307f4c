use crate::domain::{
    error::HashError,
    models::credential::{HashedPassword, PlainPassword},
};

/// Service for hashing passwords before they are persisted. The plaintext
/// never leaves this boundary in any other form.
pub trait PasswordHasher: Clone {
    fn hash(&self, plain_password: &PlainPassword) -> Result<HashedPassword, HashError>;
}
