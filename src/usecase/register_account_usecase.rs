//! Provisioning saga: ordered creation across the identity service and
//! the relational store, with compensating deletion of the identity when
//! the local phase fails.

use crate::domain::{
    error::{DuplicateLocation, IdentityError, RegistrationError, RepositoryError},
    models::{
        identity::Identity,
        registration::{RegistrationOutcome, RegistrationRequest},
    },
    repositories::{
        account_repository::AccountRepository,
        provisioning_repository::ProvisioningRepository,
    },
    services::{identity_provider::IdentityProvider, password_service::PasswordHasher},
};
use crate::usecase::uniqueness_precheck::{UniquenessPrecheck, UniquenessVerdict};

/// Saga steps, in order. Every failure exit is terminal for the
/// invocation; only a relational-write failure passes through
/// `Compensating` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SagaStep {
    Prechecking,
    ProvisioningIdentity,
    WritingRelationalState,
    Compensating,
}

/// Coordinator for one registration saga. Sole entry point to the core;
/// owns step ordering and the compensation decision. Holds no mutable
/// state, so one instance serves any number of concurrent invocations.
pub struct RegisterAccountUsecase<I, A, R, P>
where
    I: IdentityProvider,
    A: AccountRepository,
    R: ProvisioningRepository,
    P: PasswordHasher,
{
    identity_provider: I,
    precheck: UniquenessPrecheck<I, A>,
    provisioning: R,
    password_hasher: P,
}

impl<I, A, R, P> RegisterAccountUsecase<I, A, R, P>
where
    I: IdentityProvider + Clone + Send + Sync,
    A: AccountRepository + Send + Sync,
    R: ProvisioningRepository + Send + Sync,
    P: PasswordHasher + Send + Sync,
{
    pub fn new(identity_provider: I, accounts: A, provisioning: R, password_hasher: P) -> Self {
        let precheck = UniquenessPrecheck::new(identity_provider.clone(), accounts);
        Self {
            identity_provider,
            precheck,
            provisioning,
            password_hasher,
        }
    }

    /// Run the saga once. No step is retried; callers deciding to
    /// re-invoke must expect that a prior attempt whose compensation also
    /// failed may have left an orphaned identity behind.
    pub async fn register(
        &self,
        request: RegistrationRequest,
    ) -> Result<RegistrationOutcome, RegistrationError> {
        tracing::debug!(step = ?SagaStep::Prechecking, email = %request.email(), "registration saga started");
        match self.precheck.check(request.email()).await? {
            UniquenessVerdict::Available => {}
            UniquenessVerdict::TakenInDirectory => {
                return Err(RegistrationError::DuplicateIdentifier {
                    location: DuplicateLocation::Directory,
                });
            }
            UniquenessVerdict::TakenInIdentityProvider => {
                return Err(RegistrationError::DuplicateIdentifier {
                    location: DuplicateLocation::IdentityProvider,
                });
            }
        }

        // Hash before any side effect; the plaintext goes no further than
        // the identity-service call.
        let password_hash = self.password_hasher.hash(request.password()).map_err(|e| {
            tracing::warn!(error = %e, "credential rejected by hasher");
            RegistrationError::ValidationFailed
        })?;

        tracing::debug!(step = ?SagaStep::ProvisioningIdentity, email = %request.email(), "precheck passed");
        let identity = self.provision_identity(&request).await?;

        tracing::debug!(step = ?SagaStep::WritingRelationalState, handle = %identity.handle(), "identity provisioned");
        match self
            .provisioning
            .create_account_with_resources(&identity, request.display_name(), password_hash)
            .await
        {
            Ok(records) => {
                tracing::info!(
                    email = %request.email(),
                    handle = %identity.handle(),
                    account_id = %records.account.id().as_uuid(),
                    verification_sent = identity.verification_sent(),
                    "account registered"
                );
                Ok(RegistrationOutcome {
                    identity_handle: identity.handle().clone(),
                    account: records.account,
                    resource_group: records.resource_group,
                })
            }
            Err(write_error) => Err(self.compensate(identity, write_error).await),
        }
    }

    /// Create the identity, assign the role claim, and dispatch the
    /// verification message. A claim failure removes the half-configured
    /// identity before returning, so from the saga's point of view a
    /// provisioning failure leaves nothing to compensate. Verification
    /// dispatch is best-effort and never fails the step.
    async fn provision_identity(
        &self,
        request: &RegistrationRequest,
    ) -> Result<Identity, RegistrationError> {
        let handle = self
            .identity_provider
            .create_identity(request.email(), request.password())
            .await
            .map_err(|e| match e {
                // Lost the precheck race; the service's uniqueness
                // enforcement is the backstop.
                IdentityError::AlreadyExists => RegistrationError::DuplicateIdentifier {
                    location: DuplicateLocation::IdentityProvider,
                },
                other => {
                    tracing::warn!(email = %request.email(), error = %other, "identity creation failed");
                    RegistrationError::IdentityProvisioningFailed(other)
                }
            })?;

        if let Err(claim_error) = self
            .identity_provider
            .set_role_claim(&handle, request.role())
            .await
        {
            tracing::warn!(handle = %handle, error = %claim_error, "role claim assignment failed");
            if let Err(revoke_error) = self.identity_provider.delete_identity(&handle).await {
                tracing::error!(
                    handle = %handle,
                    email = %request.email(),
                    error = %revoke_error,
                    "failed to remove partially configured identity"
                );
            }
            return Err(RegistrationError::IdentityProvisioningFailed(claim_error));
        }

        let verification_sent = match self.identity_provider.send_verification(&handle).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(handle = %handle, error = %e, "verification dispatch failed");
                false
            }
        };

        Ok(Identity::new(
            handle,
            request.email().clone(),
            request.role(),
            verification_sent,
        ))
    }

    /// Undo the identity creation after a relational failure. A clean
    /// revoke surfaces the original write error; a failed revoke is the
    /// orphan case and is reported with the handle and email so an
    /// operator can clean up out of band.
    async fn compensate(
        &self,
        identity: Identity,
        write_error: RepositoryError,
    ) -> RegistrationError {
        tracing::debug!(step = ?SagaStep::Compensating, handle = %identity.handle(), "relational write failed");
        match self.identity_provider.delete_identity(identity.handle()).await {
            Ok(()) => {
                tracing::warn!(
                    handle = %identity.handle(),
                    email = %identity.email(),
                    error = %write_error,
                    "registration rolled back, identity revoked"
                );
                RegistrationError::RelationalWriteFailed(write_error)
            }
            Err(revoke_error) => {
                tracing::error!(
                    handle = %identity.handle(),
                    email = %identity.email(),
                    write_error = %write_error,
                    revoke_error = %revoke_error,
                    "compensation failed, identity orphaned"
                );
                RegistrationError::CompensationFailed {
                    cause: write_error,
                    revoke_error,
                    orphan_handle: identity.handle().clone(),
                    email: identity.email().to_string(),
                }
            }
        }
    }
}
