//! Session registry implementation
//!
//! Maps a worker identity to its live driver handle, last-resolved element
//! and wait-strategy alias. Access is partitioned by key; a session that was
//! unbound or quit is never handed out again.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::error::{Error, Result};
use crate::protocol::traits::DriverClient;
use crate::protocol::types::ElementHandle;

/// Opaque worker/test identity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey(String);

impl SessionKey {
    /// Generate a fresh key
    pub fn generate() -> Self {
        SessionKey(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionKey {
    fn from(key: &str) -> Self {
        SessionKey(key.to_string())
    }
}

impl From<String> for SessionKey {
    fn from(key: String) -> Self {
        SessionKey(key)
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The binding between one test worker and one live browser connection
#[derive(Debug)]
pub struct Session {
    key: SessionKey,
    driver: Arc<dyn DriverClient>,
    // Overwritten on every wait resolution; a monitoring collaborator may
    // read it while the owning worker writes.
    current_element: RwLock<Option<ElementHandle>>,
    wait_alias: String,
}

impl Session {
    fn new(key: SessionKey, driver: Arc<dyn DriverClient>, wait_alias: String) -> Self {
        Self {
            key,
            driver,
            current_element: RwLock::new(None),
            wait_alias,
        }
    }

    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    /// The driver handle exclusively owned by this session
    pub fn driver(&self) -> Arc<dyn DriverClient> {
        self.driver.clone()
    }

    /// Alias of the wait strategy bound to this session
    pub fn wait_alias(&self) -> &str {
        &self.wait_alias
    }

    /// Record the element a wait strategy just resolved
    pub fn set_current_element(&self, element: ElementHandle) {
        // No code runs under this guard, so a poisoned lock still holds a
        // usable value; recover it rather than panic
        *self
            .current_element
            .write()
            .unwrap_or_else(|e| e.into_inner()) = Some(element);
    }

    /// The last element resolved for this session, if any
    pub fn current_element(&self) -> Option<ElementHandle> {
        self.current_element
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

/// Registry of all live sessions, keyed by worker identity
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionKey, Arc<Session>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session for `key`
    pub fn bind(
        &self,
        key: SessionKey,
        driver: Arc<dyn DriverClient>,
        wait_alias: &str,
    ) -> Result<Arc<Session>> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?;

        if sessions.contains_key(&key) {
            return Err(Error::duplicate_session(key.as_str()));
        }

        debug!(key = %key, wait = wait_alias, "binding session");
        let session = Arc::new(Session::new(key.clone(), driver, wait_alias.to_string()));
        sessions.insert(key, session.clone());
        Ok(session)
    }

    /// Look up the session bound to `key`
    pub fn get(&self, key: &SessionKey) -> Result<Arc<Session>> {
        self.sessions
            .read()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?
            .get(key)
            .cloned()
            .ok_or_else(|| Error::no_active_session(key.as_str()))
    }

    /// Remove the session bound to `key`; no-op when absent
    pub fn unbind(&self, key: &SessionKey) {
        if let Ok(mut sessions) = self.sessions.write() {
            if sessions.remove(key).is_some() {
                debug!(key = %key, "session unbound");
            }
        }
    }

    /// Number of live sessions
    pub fn count(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }
}
