use sea_orm::prelude::Uuid;
use serde::{Deserialize, Serialize};

use crate::domain::models::credential::HashedPassword;
use crate::domain::models::identity::IdentityHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountId(Uuid);

impl AccountId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

/// External identifier of the principal, shared by both systems of record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Accepts a syntactically plausible address. Field-level format rules
    /// live in the validation gate; this only rejects values that could
    /// never be an address.
    pub fn new(value: String) -> Option<Self> {
        let (local, domain) = value.split_once('@')?;
        if local.is_empty() || !domain.contains('.') {
            return None;
        }
        Some(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Requested role of the new account holder. Administrators own a
/// resource group; mentors get a bare account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Administrator,
    Mentor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Administrator => "administrator",
            Self::Mentor => "mentor",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "administrator" => Some(Self::Administrator),
            "mentor" => Some(Self::Mentor),
            _ => None,
        }
    }

    /// Whether provisioning this role creates an owned resource group and
    /// the link record in the same transaction.
    pub fn owns_resource_group(&self) -> bool {
        matches!(self, Self::Administrator)
    }
}

/// Local record of a provisioned principal. Exists only if the whole saga
/// committed; `identity_handle` references the external identity. Not
/// serializable: the hash stays inside the domain, projections go out.
#[derive(Debug, Clone)]
pub struct Account {
    id: AccountId,
    identity_handle: IdentityHandle,
    email: EmailAddress,
    role: Role,
    display_name: String,
    password_hash: HashedPassword,
}

impl Account {
    pub fn new(
        id: AccountId,
        identity_handle: IdentityHandle,
        email: EmailAddress,
        role: Role,
        display_name: String,
        password_hash: HashedPassword,
    ) -> Self {
        Self {
            id,
            identity_handle,
            email,
            role,
            display_name,
            password_hash,
        }
    }

    pub fn id(&self) -> &AccountId {
        &self.id
    }
    pub fn identity_handle(&self) -> &IdentityHandle {
        &self.identity_handle
    }
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }
    pub fn role(&self) -> Role {
        self.role
    }
    pub fn display_name(&self) -> &str {
        &self.display_name
    }
    pub fn password_hash(&self) -> &HashedPassword {
        &self.password_hash
    }
}
