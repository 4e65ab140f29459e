//! Session context holding the bearer credential.
//!
//! A `Session` is a cheap cloneable handle; every clone observes the same
//! credential. The transport reads it on each outgoing request. Only
//! `set_credential` and `clear_credential` mutate it.

use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Default)]
pub struct Session {
    credential: Arc<RwLock<Option<String>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session that already holds `token`.
    pub fn with_credential(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.set_credential(token);
        session
    }

    /// Current bearer token, if any.
    pub fn credential(&self) -> Option<String> {
        match self.credential.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.credential().is_some()
    }

    pub fn set_credential(&self, token: impl Into<String>) {
        let token = token.into();
        let mut guard = match self.credential.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = if token.is_empty() { None } else { Some(token) };
    }

    pub fn clear_credential(&self) {
        let mut guard = match self.credential.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if guard.take().is_some() {
            tracing::debug!("Cleared session credential");
        }
    }
}
