//! Session context
//!
//! Consumer-facing facade over the auth service. Owns the in-memory session and
//! broadcasts every change to subscribers; shared credential state stays in the
//! [`SessionStore`].

use newwork_core::Session;
use tokio::sync::watch;
use tracing::info;

use crate::auth::{AuthResult, AuthService, Authenticator};
use crate::store::SessionStore;

/// Observable authentication state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated(Session),
}

impl From<Option<Session>> for SessionState {
    fn from(session: Option<Session>) -> Self {
        match session {
            Some(session) => SessionState::Authenticated(session),
            None => SessionState::Anonymous,
        }
    }
}

pub struct SessionContext<A: Authenticator = AuthService> {
    authenticator: A,
    store: SessionStore,
    session: watch::Sender<Option<Session>>,
}

impl SessionContext<AuthService> {
    /// Context over the HTTP auth service, sharing its client's credential store
    pub fn from_service(service: AuthService) -> Self {
        let store = service.store().clone();
        Self::new(service, store)
    }
}

impl<A: Authenticator> SessionContext<A> {
    /// Start in the `Anonymous` state
    ///
    /// `store` must be the same store the authenticator installs credentials into.
    pub fn new(authenticator: A, store: SessionStore) -> Self {
        let (session, _) = watch::channel(None);
        Self {
            authenticator,
            store,
            session,
        }
    }

    pub fn current_session(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.borrow().is_some()
    }

    pub fn state(&self) -> SessionState {
        self.current_session().into()
    }

    /// Receiver notified on every session change
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn authenticator(&self) -> &A {
        &self.authenticator
    }

    /// Authenticate and replace the current session
    ///
    /// On failure the current session is left untouched and the error is returned as is.
    pub async fn login(&self, identifier: &str, secret: &str) -> AuthResult<()> {
        let session = self.authenticator.authenticate(identifier, secret).await?;
        info!(
            role = %session.role,
            employee_id = %session.employee_id,
            "Session established"
        );
        self.session.send_replace(Some(session));
        Ok(())
    }

    /// Drop the session and the shared credential; a no-op when already anonymous
    pub fn logout(&self) {
        let changed = self.session.send_if_modified(|session| session.take().is_some());
        self.store.clear();
        if changed {
            info!("Session cleared");
        }
    }
}
