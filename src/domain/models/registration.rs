use crate::domain::models::account::{Account, EmailAddress, Role};
use crate::domain::models::credential::PlainPassword;
use crate::domain::models::identity::IdentityHandle;
use crate::domain::models::resource_group::ResourceGroup;

/// Input to one saga invocation. Built per call, immutable, discarded once
/// the saga completes. The validation gate has already run when one of
/// these exists.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    email: EmailAddress,
    password: PlainPassword,
    display_name: String,
    role: Role,
}

impl RegistrationRequest {
    pub fn new(
        email: EmailAddress,
        password: PlainPassword,
        display_name: String,
        role: Role,
    ) -> Self {
        Self {
            email,
            password,
            display_name,
            role,
        }
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }
    pub fn password(&self) -> &PlainPassword {
        &self.password
    }
    pub fn display_name(&self) -> &str {
        &self.display_name
    }
    pub fn role(&self) -> Role {
        self.role
    }
}

/// Success projection of a committed saga: the external identity plus the
/// records the relational unit of work created. `resource_group` is `None`
/// for roles that do not own one.
#[derive(Debug, Clone)]
pub struct RegistrationOutcome {
    pub identity_handle: IdentityHandle,
    pub account: Account,
    pub resource_group: Option<ResourceGroup>,
}
