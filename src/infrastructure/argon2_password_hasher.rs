use argon2::{
    Argon2,
    password_hash::{PasswordHasher as Argon2Hasher, SaltString, rand_core::OsRng},
};

use crate::domain::{
    error::HashError,
    models::credential::{HashedPassword, PlainPassword},
    services::password_service::PasswordHasher,
};

#[derive(Clone)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, plain_password: &PlainPassword) -> Result<HashedPassword, HashError> {
        // The validation gate enforces this too; last line of defense
        // before a credential reaches the hasher.
        if plain_password.expose().len() < 8 {
            return Err(HashError::WeakPassword);
        }

        let salt = SaltString::generate(OsRng);
        let argon2 = Argon2::default();

        let hash = argon2
            .hash_password(plain_password.expose().as_bytes(), &salt)
            .map_err(|e| HashError::Backend(e.to_string()))?
            .to_string();

        Ok(HashedPassword::new(hash))
    }
}
