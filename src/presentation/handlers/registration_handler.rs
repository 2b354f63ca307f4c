use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        error::RegistrationError,
        models::{
            account::{Account, EmailAddress, Role},
            credential::PlainPassword,
            registration::{RegistrationOutcome, RegistrationRequest},
            resource_group::ResourceGroup,
        },
        repositories::{
            account_repository::AccountRepository,
            provisioning_repository::ProvisioningRepository,
        },
        services::{identity_provider::IdentityProvider, password_service::PasswordHasher},
    },
    usecase::register_account_usecase::RegisterAccountUsecase,
};

// Request

/// json for register request; the role comes from the route
#[derive(Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

// Response

#[derive(Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub identity_handle: String,
    pub account: AccountInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<ResourceGroupInfo>,
}

#[derive(Serialize, Deserialize)]
pub struct AccountInfo {
    pub id: String,
    pub email: String,
    pub role: String,
    pub display_name: String,
}

#[derive(Serialize, Deserialize)]
pub struct ResourceGroupInfo {
    pub id: String,
    pub name: String,
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    /// Which system already holds the email, for duplicate errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// One field-level violation from the validation gate.
#[derive(Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

#[derive(Serialize, Deserialize)]
pub struct ViolationResponse {
    pub errors: Vec<FieldViolation>,
}

impl From<Account> for AccountInfo {
    fn from(account: Account) -> Self {
        Self {
            id: account.id().as_uuid().to_string(),
            email: account.email().as_str().to_string(),
            role: account.role().as_str().to_string(),
            display_name: account.display_name().to_string(),
        }
    }
}

impl From<ResourceGroup> for ResourceGroupInfo {
    fn from(group: ResourceGroup) -> Self {
        Self {
            id: group.id().as_uuid().to_string(),
            name: group.name().to_string(),
        }
    }
}

/* Validation gate */

fn violation(field: &str, message: &str) -> FieldViolation {
    FieldViolation {
        field: field.to_string(),
        message: message.to_string(),
    }
}

/// Field-level checks run before the saga is invoked; the saga assumes
/// its input is already well-formed.
pub fn validate_register(payload: &RegisterRequest) -> Vec<FieldViolation> {
    let mut violations = Vec::new();

    if payload.email.len() > 254 || EmailAddress::new(payload.email.clone()).is_none() {
        violations.push(violation("email", "must be a valid email address"));
    }

    if payload.password.len() < 8 {
        violations.push(violation("password", "must be at least 8 characters"));
    } else {
        let has_upper = payload.password.chars().any(|c| c.is_ascii_uppercase());
        let has_lower = payload.password.chars().any(|c| c.is_ascii_lowercase());
        let has_digit = payload.password.chars().any(|c| c.is_ascii_digit());
        if !(has_upper && has_lower && has_digit) {
            violations.push(violation(
                "password",
                "must contain an uppercase letter, a lowercase letter and a digit",
            ));
        }
    }

    let name = payload.display_name.trim();
    if name.is_empty() || name.len() > 64 {
        violations.push(violation("display_name", "must be 1 to 64 characters"));
    }

    violations
}

/// Stable outward status per classified kind. Client-caused failures are
/// 4xx; dependency problems and the orphan case stay on the service side.
fn status_for(error: &RegistrationError) -> StatusCode {
    match error {
        RegistrationError::ValidationFailed => StatusCode::BAD_REQUEST,
        RegistrationError::DuplicateIdentifier { .. } => StatusCode::CONFLICT,
        RegistrationError::IdentityProvisioningFailed(_) => StatusCode::BAD_GATEWAY,
        RegistrationError::DependencyUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        RegistrationError::RelationalWriteFailed(_) | RegistrationError::CompensationFailed { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/* Router Function and Handler Function */

/// function return Router object
/// Suppose to be nested by main router
pub fn create_registration_router<I, A, R, P>(
    register_service: RegisterAccountUsecase<I, A, R, P>,
) -> Router
where
    I: IdentityProvider + Clone + Send + Sync + 'static,
    A: AccountRepository + Send + Sync + 'static,
    R: ProvisioningRepository + Send + Sync + 'static,
    P: PasswordHasher + Send + Sync + 'static,
{
    let state = AppState {
        register_service: Arc::new(register_service),
    };

    Router::new()
        .route("/register", post(register_administrator::<I, A, R, P>))
        .route("/mentor-register", post(register_mentor::<I, A, R, P>))
        .with_state(state)
}

pub struct AppState<
    I: IdentityProvider,
    A: AccountRepository,
    R: ProvisioningRepository,
    P: PasswordHasher,
> {
    pub register_service: Arc<RegisterAccountUsecase<I, A, R, P>>,
}

impl<I, A, R, P> Clone for AppState<I, A, R, P>
where
    I: IdentityProvider,
    A: AccountRepository,
    R: ProvisioningRepository,
    P: PasswordHasher,
{
    fn clone(&self) -> Self {
        Self {
            register_service: Arc::clone(&self.register_service),
        }
    }
}

// handler function

/// handler function for administrator registration
async fn register_administrator<I, A, R, P>(
    State(state): State<AppState<I, A, R, P>>,
    Json(payload): Json<RegisterRequest>,
) -> axum::response::Response
where
    I: IdentityProvider + Clone + Send + Sync,
    A: AccountRepository + Send + Sync,
    R: ProvisioningRepository + Send + Sync,
    P: PasswordHasher + Send + Sync,
{
    register(state, payload, Role::Administrator).await
}

/// handler function for mentor registration
async fn register_mentor<I, A, R, P>(
    State(state): State<AppState<I, A, R, P>>,
    Json(payload): Json<RegisterRequest>,
) -> axum::response::Response
where
    I: IdentityProvider + Clone + Send + Sync,
    A: AccountRepository + Send + Sync,
    R: ProvisioningRepository + Send + Sync,
    P: PasswordHasher + Send + Sync,
{
    register(state, payload, Role::Mentor).await
}

async fn register<I, A, R, P>(
    state: AppState<I, A, R, P>,
    payload: RegisterRequest,
    role: Role,
) -> axum::response::Response
where
    I: IdentityProvider + Clone + Send + Sync,
    A: AccountRepository + Send + Sync,
    R: ProvisioningRepository + Send + Sync,
    P: PasswordHasher + Send + Sync,
{
    let violations = validate_register(&payload);
    if !violations.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ViolationResponse { errors: violations }),
        )
            .into_response();
    }

    // Validated above; a failure here would be a gate bug.
    let Some(email) = EmailAddress::new(payload.email) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ViolationResponse {
                errors: vec![violation("email", "must be a valid email address")],
            }),
        )
            .into_response();
    };

    let request = RegistrationRequest::new(
        email,
        PlainPassword::new(payload.password),
        payload.display_name.trim().to_string(),
        role,
    );

    match state.register_service.register(request).await {
        Ok(outcome) => {
            let RegistrationOutcome {
                identity_handle,
                account,
                resource_group,
            } = outcome;
            let response = RegisterResponse {
                message: "registered successfully".to_string(),
                identity_handle: identity_handle.as_str().to_string(),
                account: account.into(),
                resource_group: resource_group.map(Into::into),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(error) => {
            let location = match &error {
                RegistrationError::DuplicateIdentifier { location } => {
                    Some(location.as_str().to_string())
                }
                _ => None,
            };
            let response = ErrorResponse {
                error: error.kind().to_string(),
                message: error.to_string(),
                location,
            };
            (status_for(&error), Json(response)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::{
        DuplicateLocation, IdentityError, RepositoryError,
    };
    use crate::domain::models::identity::IdentityHandle;

    fn payload(email: &str, password: &str, name: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            display_name: name.to_string(),
        }
    }

    #[test]
    fn well_formed_payload_passes_the_gate() {
        assert!(validate_register(&payload("a@x.com", "P@ssw0rd1", "Ann")).is_empty());
    }

    #[test]
    fn each_field_is_checked() {
        let violations = validate_register(&payload("not-an-email", "weak", ""));
        let fields: Vec<_> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["email", "password", "display_name"]);
    }

    #[test]
    fn password_needs_mixed_character_classes() {
        let violations = validate_register(&payload("a@x.com", "alllowercase", "Ann"));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "password");
    }

    #[test]
    fn statuses_are_stable_per_kind() {
        assert_eq!(
            status_for(&RegistrationError::DuplicateIdentifier {
                location: DuplicateLocation::Directory
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&RegistrationError::ValidationFailed),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&RegistrationError::DependencyUnavailable {
                system: "directory",
                detail: String::new()
            }),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(&RegistrationError::CompensationFailed {
                cause: RepositoryError::Timeout,
                revoke_error: IdentityError::Unavailable(String::new()),
                orphan_handle: IdentityHandle::new("idp-9".to_string()),
                email: "a@x.com".to_string(),
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
