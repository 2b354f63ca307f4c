use crate::domain::{
    error::RegistrationError,
    models::account::EmailAddress,
    repositories::account_repository::AccountRepository,
    services::identity_provider::IdentityProvider,
};

/// Outcome of the pre-flight existence check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniquenessVerdict {
    Available,
    TakenInIdentityProvider,
    TakenInDirectory,
}

/// Read-only existence check against both systems of record. Narrows but
/// does not eliminate the duplicate-creation race; the unique constraints
/// downstream are the backstop.
pub struct UniquenessPrecheck<I: IdentityProvider, A: AccountRepository> {
    identity_provider: I,
    accounts: A,
}

impl<I, A> UniquenessPrecheck<I, A>
where
    I: IdentityProvider + Send + Sync,
    A: AccountRepository + Send + Sync,
{
    pub fn new(identity_provider: I, accounts: A) -> Self {
        Self {
            identity_provider,
            accounts,
        }
    }

    /// Both lookups run concurrently; either failing aborts the saga with
    /// a dependency error, distinct from a duplicate finding. When both
    /// systems report the email as taken, the directory wins so callers
    /// see a deterministic verdict.
    pub async fn check(
        &self,
        email: &EmailAddress,
    ) -> Result<UniquenessVerdict, RegistrationError> {
        let identity_lookup = async {
            self.identity_provider.find_by_email(email).await.map_err(|e| {
                tracing::warn!(system = "identity service", error = %e, "existence lookup failed");
                RegistrationError::DependencyUnavailable {
                    system: "identity service",
                    detail: e.to_string(),
                }
            })
        };
        let directory_lookup = async {
            self.accounts.find_by_email(email).await.map_err(|e| {
                tracing::warn!(system = "directory", error = %e, "existence lookup failed");
                RegistrationError::DependencyUnavailable {
                    system: "directory",
                    detail: e.to_string(),
                }
            })
        };

        let (existing_identity, existing_account) =
            tokio::try_join!(identity_lookup, directory_lookup)?;

        if existing_account.is_some() {
            Ok(UniquenessVerdict::TakenInDirectory)
        } else if existing_identity.is_some() {
            Ok(UniquenessVerdict::TakenInIdentityProvider)
        } else {
            Ok(UniquenessVerdict::Available)
        }
    }
}
