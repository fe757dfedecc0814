//! Explicit-wait strategies
//!
//! A wait strategy blocks the calling task, polling the driver until a
//! declared precondition holds for a locator or a timeout elapses. Strategies
//! are registered by alias; the alias stored in the session selects the
//! strategy, the action's declared [`WaitCondition`] selects the predicate.

pub mod polling;

#[cfg(test)]
mod tests;

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::locator::Locator;
use crate::protocol::types::ElementHandle;
use crate::session::Session;

pub use polling::PollingWait;

/// Precondition an action declares for its target element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitCondition {
    /// Element exists in the DOM
    Presence,
    /// Element exists and has a non-zero rendered size
    Visibility,
    /// Element is visible and enabled
    Clickable,
    /// A confirm/alert dialog is open (used by accept/dismiss actions)
    Alert,
}

impl fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WaitCondition::Presence => "PRESENCE",
            WaitCondition::Visibility => "VISIBILITY",
            WaitCondition::Clickable => "CLICKABLE",
            WaitCondition::Alert => "ALERT",
        };
        f.write_str(name)
    }
}

/// Blocking poll-until-condition resolver
#[async_trait]
pub trait WaitFor: Send + Sync {
    /// Strategy alias for registry lookup
    fn name(&self) -> &str;

    /// Block until `locator` satisfies `condition`, writing the resolved
    /// element into the session and returning it. Fails with
    /// [`Error::WaitTimeout`] only after at least the configured timeout has
    /// elapsed.
    async fn resolve(
        &self,
        session: &Session,
        locator: &Locator,
        condition: WaitCondition,
    ) -> Result<ElementHandle>;

    /// Block until an alert dialog is open, returning its text
    async fn wait_for_alert(&self, session: &Session) -> Result<String>;
}

impl fmt::Debug for dyn WaitFor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitFor")
            .field("name", &self.name())
            .finish()
    }
}

/// Registry of wait strategies by alias
pub struct WaitRegistry {
    strategies: HashMap<String, Arc<dyn WaitFor>>,
}

impl WaitRegistry {
    /// Create a registry with the built-in polling strategy configured from
    /// `config`
    pub fn new(config: &Config) -> Self {
        let mut registry = Self {
            strategies: HashMap::new(),
        };
        registry.register(Arc::new(PollingWait::from_config(config)));
        registry
    }

    /// Register a strategy under its own alias
    pub fn register(&mut self, strategy: Arc<dyn WaitFor>) {
        self.strategies
            .insert(strategy.name().to_string(), strategy);
    }

    /// Look up a strategy by alias
    pub fn get(&self, alias: &str) -> Result<Arc<dyn WaitFor>> {
        self.strategies
            .get(alias)
            .cloned()
            .ok_or_else(|| Error::configuration(format!("Unknown wait strategy: {}", alias)))
    }
}
