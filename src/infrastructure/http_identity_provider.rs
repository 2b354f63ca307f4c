//! REST client for the external identity service.
//!
//! Endpoints:
//! - `POST   {base}/v1/identities`                        create principal
//! - `PUT    {base}/v1/identities/{handle}/claims`        set role claim
//! - `POST   {base}/v1/identities/{handle}/verification`  dispatch verification
//! - `GET    {base}/v1/identities?email={email}`          lookup by email
//! - `DELETE {base}/v1/identities/{handle}`               remove principal

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::domain::{
    error::IdentityError,
    models::{
        account::{EmailAddress, Role},
        credential::PlainPassword,
        identity::IdentityHandle,
    },
    services::identity_provider::IdentityProvider,
};

#[derive(Serialize)]
struct CreateIdentityRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SetClaimRequest<'a> {
    role: &'a str,
}

#[derive(Deserialize)]
struct IdentityRecord {
    handle: String,
}

/// Shared, stateless handle; safe for concurrent sagas.
#[derive(Clone)]
pub struct HttpIdentityProvider {
    client: Client,
    base_url: String,
}

impl HttpIdentityProvider {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn transport_error(err: reqwest::Error) -> IdentityError {
    if err.is_timeout() || err.is_connect() {
        IdentityError::Unavailable(err.to_string())
    } else {
        IdentityError::Rejected(err.to_string())
    }
}

fn status_error(status: StatusCode) -> IdentityError {
    if status == StatusCode::CONFLICT {
        IdentityError::AlreadyExists
    } else if status.is_server_error() {
        IdentityError::Unavailable(format!("identity service returned {}", status))
    } else {
        IdentityError::Rejected(format!("identity service returned {}", status))
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn create_identity(
        &self,
        email: &EmailAddress,
        password: &PlainPassword,
    ) -> Result<IdentityHandle, IdentityError> {
        let response = self
            .client
            .post(self.url("/v1/identities"))
            .json(&CreateIdentityRequest {
                email: email.as_str(),
                password: password.expose(),
            })
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(status_error(response.status()));
        }

        let record: IdentityRecord = response.json().await.map_err(transport_error)?;
        Ok(IdentityHandle::new(record.handle))
    }

    async fn set_role_claim(
        &self,
        handle: &IdentityHandle,
        role: Role,
    ) -> Result<(), IdentityError> {
        let response = self
            .client
            .put(self.url(&format!("/v1/identities/{}/claims", handle.as_str())))
            .json(&SetClaimRequest {
                role: role.as_str(),
            })
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(status_error(response.status()));
        }
        Ok(())
    }

    async fn send_verification(&self, handle: &IdentityHandle) -> Result<(), IdentityError> {
        let response = self
            .client
            .post(self.url(&format!("/v1/identities/{}/verification", handle.as_str())))
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(status_error(response.status()));
        }
        Ok(())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<IdentityHandle>, IdentityError> {
        let response = self
            .client
            .get(self.url("/v1/identities"))
            .query(&[("email", email.as_str())])
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(status_error(response.status()));
        }

        let record: IdentityRecord = response.json().await.map_err(transport_error)?;
        Ok(Some(IdentityHandle::new(record.handle)))
    }

    async fn delete_identity(&self, handle: &IdentityHandle) -> Result<(), IdentityError> {
        let response = self
            .client
            .delete(self.url(&format!("/v1/identities/{}", handle.as_str())))
            .send()
            .await
            .map_err(transport_error)?;

        // Already-removed identities report success so compensation stays
        // idempotent and the coordinator never retries it into a wall.
        if response.status() == StatusCode::NOT_FOUND || response.status().is_success() {
            return Ok(());
        }
        Err(status_error(response.status()))
    }
}
