//! Action controller façade
//!
//! One [`ActionController`] per test worker. Every action runs the same
//! pipeline: session lookup, (optional) wait resolution for the target
//! element, one protocol call, with the whole sequence re-attempted under
//! the controller's retry budget when the failure is transient.

pub mod browser;
pub mod element;
pub mod screenshot;

#[cfg(test)]
mod tests;

use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use crate::config::Config;
use crate::error::Result;
use crate::files::{FileStore, FsFileStore};
use crate::locator::Locator;
use crate::protocol::traits::DriverClient;
use crate::protocol::types::ElementHandle;
use crate::retry::{with_retry, RetrySpec};
use crate::session::{Session, SessionKey, SessionRegistry};
use crate::waits::{WaitCondition, WaitFor, WaitRegistry};

/// How [`ActionController::quit`] ends the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseSession {
    /// End the browser process; the session is always unbound
    Quit,
    /// Close the current window only; the session is unbound when that was
    /// the last one
    Close,
}

/// High-level action surface for one test worker
pub struct ActionController {
    key: SessionKey,
    registry: Arc<SessionRegistry>,
    waits: Arc<WaitRegistry>,
    files: Arc<dyn FileStore>,
    wait_alias: String,
    retry: RetrySpec,
}

impl ActionController {
    pub fn new(
        key: SessionKey,
        registry: Arc<SessionRegistry>,
        waits: Arc<WaitRegistry>,
        files: Arc<dyn FileStore>,
        config: &Config,
    ) -> Self {
        Self {
            key,
            registry,
            waits,
            files,
            wait_alias: config.wait_strategy.clone(),
            retry: RetrySpec::attempts(config.retry_attempts),
        }
    }

    /// Controller with its own registry and filesystem store, for workers
    /// that do not share session state
    pub fn standalone(key: SessionKey, config: &Config) -> Self {
        Self::new(
            key,
            Arc::new(SessionRegistry::new()),
            Arc::new(WaitRegistry::new(config)),
            Arc::new(FsFileStore::from_config(config)),
            config,
        )
    }

    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    /// Bind a live driver to this controller's worker key
    pub fn bind_session(&self, driver: Arc<dyn DriverClient>) -> Result<Arc<Session>> {
        self.registry.bind(self.key.clone(), driver, &self.wait_alias)
    }

    /// The session bound to this worker; fails before bind and after quit
    pub(crate) fn session(&self) -> Result<Arc<Session>> {
        self.registry.get(&self.key)
    }

    pub(crate) fn wait_for(&self, session: &Session) -> Result<Arc<dyn WaitFor>> {
        self.waits.get(session.wait_alias())
    }

    pub(crate) fn files(&self) -> &Arc<dyn FileStore> {
        &self.files
    }

    pub(crate) fn retry_spec(&self) -> RetrySpec {
        self.retry
    }

    /// Resolve `locator` under `condition` once, without retry
    pub(crate) async fn resolve(
        &self,
        locator: &Locator,
        condition: WaitCondition,
    ) -> Result<(Arc<Session>, ElementHandle)> {
        let session = self.session()?;
        let wait = self.wait_for(&session)?;
        let handle = wait.resolve(&session, locator, condition).await?;
        Ok((session, handle))
    }

    /// Wait for `locator` under `condition`, then run `f` against the
    /// resolved element. Retried as a whole under `retry`: every attempt
    /// re-resolves the element, so a stale handle is replaced on re-try.
    pub(crate) async fn act<T, F, Fut>(
        &self,
        locator: &Locator,
        condition: WaitCondition,
        retry: RetrySpec,
        f: F,
    ) -> Result<T>
    where
        F: Fn(Arc<dyn DriverClient>, ElementHandle) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let session = self.session()?;
        let wait = self.wait_for(&session)?;
        debug!(key = %self.key, %locator, %condition, "action");

        with_retry(retry, || {
            let session = session.clone();
            let wait = wait.clone();
            let f = &f;
            async move {
                let handle = wait.resolve(&session, locator, condition).await?;
                f(session.driver(), handle).await
            }
        })
        .await
    }

    /// Run a driver call without element resolution, retried under `retry`
    pub(crate) async fn drive<T, F, Fut>(&self, retry: RetrySpec, f: F) -> Result<T>
    where
        F: Fn(Arc<dyn DriverClient>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let session = self.session()?;
        with_retry(retry, || f(session.driver())).await
    }
}
