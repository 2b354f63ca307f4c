use thiserror::Error;

use crate::domain::models::identity::IdentityHandle;

/// Which system reported an existing principal for the requested email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateLocation {
    IdentityProvider,
    Directory,
}

impl DuplicateLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IdentityProvider => "identity_provider",
            Self::Directory => "directory",
        }
    }
}

/// Failures reported by the external identity service client.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity service unreachable: {0}")]
    Unavailable(String),

    #[error("email already registered with the identity service")]
    AlreadyExists,

    #[error("identity service rejected the request: {0}")]
    Rejected(String),
}

/// Failures reported by the relational store.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("not found")]
    NotFound,

    #[error("unique constraint violated")]
    UniqueViolation,

    #[error("database operation timed out")]
    Timeout,

    #[error("database error: {0}")]
    DatabaseError(String),
}

/// Failures while hashing the submitted credential.
#[derive(Debug, Error)]
pub enum HashError {
    #[error("weak password (minimum 8 characters required)")]
    WeakPassword,

    #[error("password hashing failed: {0}")]
    Backend(String),
}

/// Classified outcome of a failed registration saga.
///
/// Closed set: every failure leaving the saga coordinator is one of these
/// kinds. The `Display` messages are caller-facing and carry no transport
/// detail; raw diagnostics stay in the source fields and are emitted only
/// through tracing.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("a registration field failed validation")]
    ValidationFailed,

    #[error("an account with this email already exists")]
    DuplicateIdentifier { location: DuplicateLocation },

    #[error("could not provision the identity")]
    IdentityProvisioningFailed(#[source] IdentityError),

    #[error("could not persist the account records")]
    RelationalWriteFailed(#[source] RepositoryError),

    /// The relational write failed and the compensating identity removal
    /// also failed, leaving an orphaned identity behind. Carries everything
    /// an operator needs for out-of-band cleanup.
    #[error("account creation failed and the identity could not be removed")]
    CompensationFailed {
        #[source]
        cause: RepositoryError,
        revoke_error: IdentityError,
        orphan_handle: IdentityHandle,
        email: String,
    },

    #[error("a registration dependency is unavailable")]
    DependencyUnavailable { system: &'static str, detail: String },
}

impl RegistrationError {
    /// Stable machine-readable tag for the outward-facing response body.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ValidationFailed => "validation_failed",
            Self::DuplicateIdentifier { .. } => "duplicate_identifier",
            Self::IdentityProvisioningFailed(_) => "identity_provisioning_failed",
            Self::RelationalWriteFailed(_) => "relational_write_failed",
            Self::CompensationFailed { .. } => "compensation_failed",
            Self::DependencyUnavailable { .. } => "dependency_unavailable",
        }
    }

    /// Duplicates and validation problems are caused by the request as
    /// sent; retrying it unchanged cannot succeed.
    pub fn is_client_caused(&self) -> bool {
        matches!(
            self,
            Self::ValidationFailed | Self::DuplicateIdentifier { .. }
        )
    }
}
