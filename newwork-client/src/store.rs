//! Credential holder shared by the request layer and the session context

use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Single slot holding the active bearer credential
///
/// Clones share the same slot. Independent instances created with [`SessionStore::new`]
/// are fully isolated, so tests and multi-tenant callers do not share ambient state.
/// Writes replace the slot atomically under a write lock: the last completed write wins.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    credential: Arc<RwLock<Option<String>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or clear the active credential
    pub fn set_credential(&self, credential: Option<String>) {
        let installed = credential.is_some();
        let mut slot = self
            .credential
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = credential;
        drop(slot);

        debug!(installed, "Session credential updated");
    }

    /// Snapshot of the active credential
    pub fn credential(&self) -> Option<String> {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn has_credential(&self) -> bool {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn clear(&self) {
        self.set_credential(None);
    }
}
