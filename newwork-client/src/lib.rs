//! Newwork Client - session-aware data access for the Newwork backend
//!
//! Layers, leaf first:
//!
//! - [`SessionStore`]: the single credential slot consulted by every outgoing request
//! - [`ApiClient`]: the request layer; injects auth and `If-Match`, normalizes responses
//!   into a [`ResponseEnvelope`]
//! - [`AuthService`]: exchanges credentials for a [`Session`] and installs the credential
//! - [`SessionContext`]: what presentation code talks to (`login`, `logout`, current session)
//!
//! ```no_run
//! use newwork_client::{ApiClient, AuthService, SessionContext, SessionStore};
//! use newwork_core::ClientConfig;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let api = ApiClient::new(ClientConfig::from_env()?, SessionStore::new())?;
//! let context = SessionContext::from_service(AuthService::new(api.clone()));
//!
//! context.login("manager@newwork.test", "Passw0rd!").await?;
//! let employees = api.get::<serde_json::Value>("/api/employees").await?;
//! assert!(employees.ok);
//! context.logout();
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod context;
pub mod store;

pub use api::{ApiClient, Method, Payload, RequestOptions, ResponseEnvelope};
pub use auth::{AuthError, AuthResult, AuthService, Authenticator};
pub use context::{SessionContext, SessionState};
pub use store::SessionStore;

pub use newwork_core::{Role, Session};
