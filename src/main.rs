mod config;
mod domain;
mod infrastructure;
mod presentation;
mod usecase;

use axum::{Router, routing::get};
use sea_orm::{ConnectOptions, Database};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crate::{
    config::Config,
    infrastructure::{
        account_repository::PostgresAccountRepository,
        argon2_password_hasher::Argon2PasswordHasher,
        http_identity_provider::HttpIdentityProvider,
        provisioning_repository::PostgresProvisioningRepository,
    },
    presentation::handlers::registration_handler::create_registration_router,
    usecase::register_account_usecase::RegisterAccountUsecase,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;

    let mut opt = ConnectOptions::new(&config.database_url);
    opt.max_connections(10).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await?;

    let identity_provider =
        HttpIdentityProvider::new(config.identity_service_url.clone(), config.identity_timeout)?;
    let account_repository =
        PostgresAccountRepository::new(db.clone(), config.database_timeout);
    let provisioning_repository =
        PostgresProvisioningRepository::new(db.clone(), config.database_timeout);
    let password_hasher = Argon2PasswordHasher::new();

    let register_service = RegisterAccountUsecase::new(
        identity_provider,
        account_repository,
        provisioning_repository,
        password_hasher,
    );

    let app = Router::new()
        .route("/", get(|| async { "ok" }))
        .nest("/api", create_registration_router(register_service));

    tracing::info!(addr = %config.bind_addr, "listening");
    let listener = TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    };

    use async_trait::async_trait;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
        response::Response,
    };
    use http_body_util::BodyExt;
    use rstest::*;
    use tower::ServiceExt;

    use crate::{
        domain::{
            error::{IdentityError, RepositoryError},
            models::{
                account::{Account, AccountId, EmailAddress, Role},
                credential::{HashedPassword, PlainPassword},
                identity::{Identity, IdentityHandle},
                resource_group::{ResourceGroup, ResourceGroupId},
            },
            repositories::{
                account_repository::AccountRepository,
                provisioning_repository::{ProvisionedRecords, ProvisioningRepository},
            },
            services::{identity_provider::IdentityProvider, password_service::PasswordHasher},
        },
        presentation::handlers::registration_handler::{
            ErrorResponse, RegisterRequest, RegisterResponse, ViolationResponse,
            create_registration_router,
        },
        usecase::register_account_usecase::RegisterAccountUsecase,
    };

    // mock identity provider, scripted by markers in the email address
    //   "taken-idp"  precheck finds an existing identity
    //   "idp-down"   identity creation fails
    //   "orphan"     compensation (delete) fails
    #[derive(Clone, Default)]
    struct MockIdentityProvider {
        calls: Arc<Mutex<Vec<String>>>,
        counter: Arc<AtomicU64>,
    }

    impl MockIdentityProvider {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl IdentityProvider for MockIdentityProvider {
        async fn create_identity(
            &self,
            email: &EmailAddress,
            _password: &PlainPassword,
        ) -> Result<IdentityHandle, IdentityError> {
            self.record(format!("create {}", email));
            if email.as_str().contains("idp-down") {
                return Err(IdentityError::Unavailable("connect refused".to_string()));
            }
            let n = self.counter.fetch_add(1, Ordering::SeqCst);
            Ok(IdentityHandle::new(format!("idp-{}-{}", n, email)))
        }

        async fn set_role_claim(
            &self,
            handle: &IdentityHandle,
            role: Role,
        ) -> Result<(), IdentityError> {
            self.record(format!("claim {} {}", handle, role.as_str()));
            Ok(())
        }

        async fn send_verification(&self, handle: &IdentityHandle) -> Result<(), IdentityError> {
            self.record(format!("verify {}", handle));
            Ok(())
        }

        async fn find_by_email(
            &self,
            email: &EmailAddress,
        ) -> Result<Option<IdentityHandle>, IdentityError> {
            if email.as_str().contains("taken-idp") {
                return Ok(Some(IdentityHandle::new("idp-existing".to_string())));
            }
            Ok(None)
        }

        async fn delete_identity(&self, handle: &IdentityHandle) -> Result<(), IdentityError> {
            self.record(format!("delete {}", handle));
            if handle.as_str().contains("orphan") {
                return Err(IdentityError::Unavailable("delete timed out".to_string()));
            }
            Ok(())
        }
    }

    // "taken-dir" in the email simulates an existing account row
    #[derive(Clone)]
    struct MockAccountRepository;

    #[async_trait]
    impl AccountRepository for MockAccountRepository {
        async fn find_by_email(
            &self,
            email: &EmailAddress,
        ) -> Result<Option<Account>, RepositoryError> {
            if email.as_str().contains("taken-dir") {
                return Ok(Some(Account::new(
                    AccountId::new(),
                    IdentityHandle::new("idp-existing".to_string()),
                    email.clone(),
                    Role::Mentor,
                    "existing".to_string(),
                    HashedPassword::new("hash".to_string()),
                )));
            }
            Ok(None)
        }
    }

    // "db-fail" or "orphan" in the email makes the transaction fail
    #[derive(Clone)]
    struct MockProvisioningRepository;

    #[async_trait]
    impl ProvisioningRepository for MockProvisioningRepository {
        async fn create_account_with_resources(
            &self,
            identity: &Identity,
            display_name: &str,
            password_hash: HashedPassword,
        ) -> Result<ProvisionedRecords, RepositoryError> {
            let email = identity.email().as_str();
            if email.contains("db-fail") || email.contains("orphan") {
                return Err(RepositoryError::UniqueViolation);
            }
            let account = Account::new(
                AccountId::new(),
                identity.handle().clone(),
                identity.email().clone(),
                identity.role(),
                display_name.to_string(),
                password_hash,
            );
            let resource_group = identity.role().owns_resource_group().then(|| {
                ResourceGroup::new(
                    ResourceGroupId::new(),
                    ResourceGroup::name_for(display_name),
                )
            });
            Ok(ProvisionedRecords {
                account,
                resource_group,
            })
        }
    }

    #[derive(Clone)]
    struct MockPasswordHasher;

    impl PasswordHasher for MockPasswordHasher {
        fn hash(
            &self,
            _plain_password: &PlainPassword,
        ) -> Result<HashedPassword, crate::domain::error::HashError> {
            Ok(HashedPassword::new("mock_hash".to_string()))
        }
    }

    struct TestContext {
        app: Router,
        identity_calls: Arc<Mutex<Vec<String>>>,
    }

    #[fixture]
    fn test_app() -> TestContext {
        let identity_provider = MockIdentityProvider::default();
        let identity_calls = Arc::clone(&identity_provider.calls);

        let register_service = RegisterAccountUsecase::new(
            identity_provider,
            MockAccountRepository,
            MockProvisioningRepository,
            MockPasswordHasher,
        );

        // setup router: sync settings of main.app
        let app = Router::new().nest("/api", create_registration_router(register_service));
        TestContext {
            app,
            identity_calls,
        }
    }

    /// # Description
    ///
    /// General registration request helper; posts the payload to the
    /// given route and returns the raw response.
    async fn register(app: Router, route: &str, body: String) -> Response {
        app.oneshot(
            Request::builder()
                .method("POST")
                .uri(route)
                .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap()
    }

    fn body_for(email: &str, name: &str) -> String {
        serde_json::to_string(&RegisterRequest {
            email: email.to_string(),
            password: "P@ssw0rd1".to_string(),
            display_name: name.to_string(),
        })
        .unwrap()
    }

    async fn parse<T: serde::de::DeserializeOwned>(response: Response) -> T {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[rstest]
    #[tokio::test]
    async fn test_register_administrator_positive(test_app: TestContext) {
        let response = register(test_app.app, "/api/register", body_for("a@x.com", "Ann")).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let body: RegisterResponse = parse(response).await;
        assert!(!body.identity_handle.is_empty());
        assert_eq!(body.account.email, "a@x.com");
        assert_eq!(body.account.role, "administrator");
        let group = body.resource_group.expect("administrator owns a group");
        assert_eq!(group.name, "Ann's Workspace");

        // forward path only, no compensation
        let calls = test_app.identity_calls.lock().unwrap().clone();
        assert!(calls.iter().any(|c| c.starts_with("create")));
        assert!(!calls.iter().any(|c| c.starts_with("delete")));
    }

    #[rstest]
    #[tokio::test]
    async fn test_register_mentor_positive(test_app: TestContext) {
        let response = register(
            test_app.app,
            "/api/mentor-register",
            body_for("m@x.com", "Mo"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let body: RegisterResponse = parse(response).await;
        assert_eq!(body.account.role, "mentor");
        assert!(body.resource_group.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn test_register_duplicate_in_directory_negative(test_app: TestContext) {
        let response = register(
            test_app.app,
            "/api/register",
            body_for("taken-dir@x.com", "Ann"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body: ErrorResponse = parse(response).await;
        assert_eq!(body.error, "duplicate_identifier");
        assert_eq!(body.location.as_deref(), Some("directory"));

        // short-circuited before any side effect
        assert!(test_app.identity_calls.lock().unwrap().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_register_duplicate_in_identity_provider_negative(test_app: TestContext) {
        let response = register(
            test_app.app,
            "/api/register",
            body_for("taken-idp@x.com", "Ann"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body: ErrorResponse = parse(response).await;
        assert_eq!(body.error, "duplicate_identifier");
        assert_eq!(body.location.as_deref(), Some("identity_provider"));
    }

    #[rstest]
    #[tokio::test]
    async fn test_register_validation_negative(test_app: TestContext) {
        let payload = serde_json::to_string(&RegisterRequest {
            email: "not-an-email".to_string(),
            password: "weak".to_string(),
            display_name: String::new(),
        })
        .unwrap();
        let response = register(test_app.app, "/api/register", payload).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ViolationResponse = parse(response).await;
        assert_eq!(body.errors.len(), 3);
    }

    #[rstest]
    #[tokio::test]
    async fn test_register_identity_service_down_negative(test_app: TestContext) {
        let response = register(
            test_app.app,
            "/api/register",
            body_for("idp-down@x.com", "Ann"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body: ErrorResponse = parse(response).await;
        assert_eq!(body.error, "identity_provisioning_failed");
    }

    #[rstest]
    #[tokio::test]
    async fn test_register_relational_failure_compensates(test_app: TestContext) {
        let response = register(
            test_app.app,
            "/api/register",
            body_for("db-fail@x.com", "Ann"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorResponse = parse(response).await;
        assert_eq!(body.error, "relational_write_failed");

        // the identity created in the forward path was revoked
        let calls = test_app.identity_calls.lock().unwrap().clone();
        assert!(calls.iter().any(|c| c.starts_with("create")));
        assert_eq!(
            calls.iter().filter(|c| c.starts_with("delete")).count(),
            1
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_register_compensation_failure_reports_orphan(test_app: TestContext) {
        let response = register(
            test_app.app,
            "/api/register",
            body_for("orphan@x.com", "Ann"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorResponse = parse(response).await;
        assert_eq!(body.error, "compensation_failed");
    }

    #[rstest]
    #[tokio::test]
    async fn test_reissuing_an_identical_request_conflicts() {
        // First attempt succeeds; the directory then knows the email, so
        // the identical request is a duplicate and no second identity is
        // left behind.
        #[derive(Clone, Default)]
        struct RememberingAccountRepository {
            known: Arc<Mutex<Option<Account>>>,
        }

        #[async_trait]
        impl AccountRepository for RememberingAccountRepository {
            async fn find_by_email(
                &self,
                email: &EmailAddress,
            ) -> Result<Option<Account>, RepositoryError> {
                Ok(self
                    .known
                    .lock()
                    .unwrap()
                    .clone()
                    .filter(|a| a.email() == email))
            }
        }

        let identity_provider = MockIdentityProvider::default();
        let calls = Arc::clone(&identity_provider.calls);
        let accounts = RememberingAccountRepository::default();
        let known = Arc::clone(&accounts.known);
        let service = RegisterAccountUsecase::new(
            identity_provider,
            accounts,
            MockProvisioningRepository,
            MockPasswordHasher,
        );
        let app = Router::new().nest("/api", create_registration_router(service));

        let first = register(app.clone(), "/api/register", body_for("a@x.com", "Ann")).await;
        assert_eq!(first.status(), StatusCode::CREATED);
        let first_body: RegisterResponse = parse(first).await;

        // reflect the committed row, as the real directory would
        *known.lock().unwrap() = Some(Account::new(
            AccountId::new(),
            IdentityHandle::new(first_body.identity_handle.clone()),
            EmailAddress::new("a@x.com".to_string()).unwrap(),
            Role::Administrator,
            "Ann".to_string(),
            HashedPassword::new("mock_hash".to_string()),
        ));

        let second = register(app, "/api/register", body_for("a@x.com", "Ann")).await;
        assert_eq!(second.status(), StatusCode::CONFLICT);
        let second_body: ErrorResponse = parse(second).await;
        assert_eq!(second_body.error, "duplicate_identifier");

        // exactly one identity was ever created
        let creates = calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with("create"))
            .count();
        assert_eq!(creates, 1);
    }
}
