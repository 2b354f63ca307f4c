use async_trait::async_trait;

use crate::domain::{
    error::IdentityError,
    models::{
        account::{EmailAddress, Role},
        credential::PlainPassword,
        identity::IdentityHandle,
    },
};

/// Client for the external identity/authentication service.
///
/// Implementations must be stateless handles safe to share across
/// concurrent sagas.
#[async_trait]
pub trait IdentityProvider {
    /// Create a principal; the service's own uniqueness enforcement is the
    /// backstop for the precheck race and surfaces as
    /// [`IdentityError::AlreadyExists`].
    async fn create_identity(
        &self,
        email: &EmailAddress,
        password: &PlainPassword,
    ) -> Result<IdentityHandle, IdentityError>;

    async fn set_role_claim(&self, handle: &IdentityHandle, role: Role)
    -> Result<(), IdentityError>;

    /// Best-effort verification dispatch; callers log failures and move on.
    async fn send_verification(&self, handle: &IdentityHandle) -> Result<(), IdentityError>;

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<IdentityHandle>, IdentityError>;

    /// Compensating action. Idempotent: deleting an identity that is
    /// already gone reports success, and it is safe on a partially
    /// configured identity (claim not yet set).
    async fn delete_identity(&self, handle: &IdentityHandle) -> Result<(), IdentityError>;
}
