//! Fixed-interval polling wait
//!
//! Re-checks the condition at a fixed interval until it holds or the
//! timeout elapses. "Not yet ready" poll outcomes (element missing, stale
//! mid-mutation, dialog not open) are swallowed and re-polled; fatal
//! protocol failures propagate immediately.

use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::locator::Locator;
use crate::protocol::traits::DriverClient;
use crate::protocol::types::ElementHandle;
use crate::session::Session;
use crate::waits::{WaitCondition, WaitFor};

/// Polling wait strategy with a fixed timeout and interval
#[derive(Debug, Clone)]
pub struct PollingWait {
    timeout: Duration,
    interval: Duration,
}

impl PollingWait {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.wait_timeout(), config.poll_interval())
    }

    /// One predicate evaluation: `Ok(Some(_))` satisfied, `Ok(None)` not yet
    async fn check(
        &self,
        driver: &dyn DriverClient,
        locator: &Locator,
        condition: WaitCondition,
    ) -> Result<Option<ElementHandle>> {
        let handle = driver.find_element(locator).await?;

        match condition {
            WaitCondition::Presence => Ok(Some(handle)),
            WaitCondition::Visibility => {
                if Self::is_visible(driver, &handle).await? {
                    Ok(Some(handle))
                } else {
                    Ok(None)
                }
            }
            WaitCondition::Clickable => {
                if Self::is_visible(driver, &handle).await? && driver.is_enabled(&handle).await? {
                    Ok(Some(handle))
                } else {
                    Ok(None)
                }
            }
            WaitCondition::Alert => Err(Error::internal(
                "Alert condition has no element predicate",
            )),
        }
    }

    async fn is_visible(driver: &dyn DriverClient, handle: &ElementHandle) -> Result<bool> {
        Ok(driver.is_displayed(handle).await? && !driver.size(handle).await?.is_zero())
    }
}

#[async_trait]
impl WaitFor for PollingWait {
    fn name(&self) -> &str {
        "polling"
    }

    async fn resolve(
        &self,
        session: &Session,
        locator: &Locator,
        condition: WaitCondition,
    ) -> Result<ElementHandle> {
        let driver = session.driver();
        let start = Instant::now();
        debug!(%locator, %condition, "waiting for element");

        loop {
            match self.check(driver.as_ref(), locator, condition).await {
                Ok(Some(handle)) => {
                    debug!(%locator, elapsed = ?start.elapsed(), "condition satisfied");
                    session.set_current_element(handle.clone());
                    return Ok(handle);
                }
                Ok(None) => trace!(%locator, "condition not yet satisfied"),
                Err(e) if e.is_transient() => trace!(%locator, error = %e, "poll swallowed"),
                Err(e) => return Err(e),
            }

            if start.elapsed() >= self.timeout {
                // One last evaluation at the deadline
                if let Ok(Some(handle)) = self.check(driver.as_ref(), locator, condition).await {
                    session.set_current_element(handle.clone());
                    return Ok(handle);
                }
                return Err(Error::WaitTimeout {
                    locator: locator.to_string(),
                    condition,
                    elapsed: start.elapsed(),
                });
            }

            tokio::time::sleep(self.interval).await;
        }
    }

    async fn wait_for_alert(&self, session: &Session) -> Result<String> {
        let driver = session.driver();
        let start = Instant::now();
        debug!("waiting for alert");

        loop {
            match driver.alert_text().await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_transient() => trace!(error = %e, "alert poll swallowed"),
                Err(e) => return Err(e),
            }

            if start.elapsed() >= self.timeout {
                return Err(Error::WaitTimeout {
                    locator: "alert".to_string(),
                    condition: WaitCondition::Alert,
                    elapsed: start.elapsed(),
                });
            }

            tokio::time::sleep(self.interval).await;
        }
    }
}
