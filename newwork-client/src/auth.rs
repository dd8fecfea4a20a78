//! Auth service
//!
//! Exchanges an identifier and secret for a [`Session`] through the request layer and,
//! on success only, installs the credential into the [`SessionStore`].

use async_trait::async_trait;
use newwork_core::{NewworkError, Role, Session};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::api::{ApiClient, RequestOptions, ResponseEnvelope};
use crate::store::SessionStore;

/// Typed login failure, keeping status detail available to callers
#[derive(Debug, Error)]
pub enum AuthError {
    /// The backend rejected the identifier/secret pair (400, 401, 403)
    #[error("Invalid credentials (HTTP {status})")]
    InvalidCredentials { status: u16 },

    #[error("Authentication service failed (HTTP {status})")]
    ServerError { status: u16 },

    #[error("Unexpected authentication response (HTTP {status})")]
    UnexpectedStatus { status: u16 },

    /// Success status but the body was not a session document
    #[error("Malformed authentication response (HTTP {status}): {message}")]
    MalformedResponse { status: u16, message: String },

    /// The backend could not be reached at all
    #[error("Could not reach authentication service: {0}")]
    Network(#[source] NewworkError),

    /// The login call could not be assembled locally
    #[error("Login request failed: {0}")]
    Client(#[source] NewworkError),
}

pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// Classify a non-success login status
    pub fn from_status(status: u16) -> Self {
        match status {
            400 | 401 | 403 => AuthError::InvalidCredentials { status },
            500..=599 => AuthError::ServerError { status },
            _ => AuthError::UnexpectedStatus { status },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            AuthError::InvalidCredentials { status }
            | AuthError::ServerError { status }
            | AuthError::UnexpectedStatus { status }
            | AuthError::MalformedResponse { status, .. } => Some(*status),
            AuthError::Network(error) | AuthError::Client(error) => error.status(),
        }
    }

    /// The backend answered and refused the login
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials { .. }
                | AuthError::ServerError { .. }
                | AuthError::UnexpectedStatus { .. }
        )
    }

    /// The backend could not be reached; retrying may help
    pub fn is_network(&self) -> bool {
        matches!(self, AuthError::Network(_))
    }
}

impl From<NewworkError> for AuthError {
    fn from(error: NewworkError) -> Self {
        match error {
            // A refusal whose body cannot be read is still a refusal
            NewworkError::Decode { status, .. } if !(200..300).contains(&status) => {
                AuthError::from_status(status)
            }
            NewworkError::Decode {
                status, message, ..
            } => AuthError::MalformedResponse { status, message },
            error if error.is_recoverable() => AuthError::Network(error),
            other => AuthError::Client(other),
        }
    }
}

/// Seam between the session context and whatever produces sessions
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, identifier: &str, secret: &str) -> AuthResult<Session>;
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// The backend sends `employeeId` as a UUID string or a number
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EmployeeId {
    Text(String),
    Number(serde_json::Number),
}

impl EmployeeId {
    fn into_canonical(self) -> String {
        match self {
            EmployeeId::Text(id) => id,
            EmployeeId::Number(id) => id.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    token: String,
    role: Role,
    employee_id: EmployeeId,
}

/// HTTP implementation of [`Authenticator`]
#[derive(Debug, Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn store(&self) -> &SessionStore {
        self.api.store()
    }
}

#[async_trait]
impl Authenticator for AuthService {
    async fn authenticate(&self, identifier: &str, secret: &str) -> AuthResult<Session> {
        info!(identifier, "Attempting login");

        let options = RequestOptions::post().json(&LoginRequest {
            email: identifier,
            password: secret,
        })?;
        let login_path = self.api.config().login_path.clone();
        let envelope: ResponseEnvelope<LoginResponse> = self
            .api
            .request(&login_path, options)
            .await
            .map_err(|e| {
                let error = AuthError::from(e);
                warn!(identifier, error = %error, "Login failed");
                error
            })?;

        if !envelope.ok {
            let error = AuthError::from_status(envelope.status);
            warn!(identifier, status = envelope.status, error = %error, "Login rejected");
            return Err(error);
        }

        let status = envelope.status;
        let response = envelope
            .into_json()
            .ok_or_else(|| AuthError::MalformedResponse {
                status,
                message: "expected a JSON session document".to_string(),
            })?;

        let session = Session::new(
            response.token,
            response.role,
            response.employee_id.into_canonical(),
        );
        self.api.store().set_credential(Some(session.token.clone()));

        info!(
            identifier,
            role = %session.role,
            employee_id = %session.employee_id,
            "Login succeeded"
        );

        Ok(session)
    }
}
