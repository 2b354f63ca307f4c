use serde::{Deserialize, Serialize};

use crate::domain::models::account::{EmailAddress, Role};

/// Opaque handle of a principal in the external identity service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityHandle(String);

impl IdentityHandle {
    pub fn new(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IdentityHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Principal as provisioned in the external identity service. Owned by
/// that system; the saga only ever holds a projection of it.
#[derive(Debug, Clone)]
pub struct Identity {
    handle: IdentityHandle,
    email: EmailAddress,
    role: Role,
    verification_sent: bool,
}

impl Identity {
    pub fn new(
        handle: IdentityHandle,
        email: EmailAddress,
        role: Role,
        verification_sent: bool,
    ) -> Self {
        Self {
            handle,
            email,
            role,
            verification_sent,
        }
    }

    pub fn handle(&self) -> &IdentityHandle {
        &self.handle
    }
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }
    pub fn role(&self) -> Role {
        self.role
    }
    pub fn verification_sent(&self) -> bool {
        self.verification_sent
    }
}
