//! Browser-level actions: navigation, cookies, timeouts, windows, frames,
//! alerts, logs, script execution and session lifecycle

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::controller::{ActionController, CloseSession};
use crate::error::{Error, Result};
use crate::protocol::types::{Cookie, Dimension, LogEntry, LogType, Point, Timeouts, WindowRect};
use crate::retry::with_retry;

impl ActionController {
    // Navigation

    #[instrument(skip(self), fields(key = %self.key()))]
    pub async fn navigate(&self, url: &str) -> Result<()> {
        self.drive(self.retry_spec(), |driver| async move {
            driver.navigate(url).await
        })
        .await
    }

    pub async fn current_url(&self) -> Result<String> {
        self.session()?.driver().current_url().await
    }

    pub async fn back(&self) -> Result<()> {
        self.drive(self.retry_spec(), |driver| async move { driver.back().await })
            .await
    }

    pub async fn forward(&self) -> Result<()> {
        self.drive(self.retry_spec(), |driver| async move {
            driver.forward().await
        })
        .await
    }

    pub async fn page_source(&self) -> Result<String> {
        self.drive(self.retry_spec(), |driver| async move {
            driver.page_source().await
        })
        .await
    }

    // Cookies

    pub async fn add_cookie(&self, cookie: Cookie) -> Result<()> {
        self.drive(self.retry_spec(), |driver| {
            let cookie = cookie.clone();
            async move { driver.add_cookie(cookie).await }
        })
        .await
    }

    pub async fn cookies(&self) -> Result<Vec<Cookie>> {
        self.drive(self.retry_spec(), |driver| async move {
            driver.cookies().await
        })
        .await
    }

    pub async fn cookie_named(&self, name: &str) -> Result<Option<Cookie>> {
        self.drive(self.retry_spec(), |driver| async move {
            driver.cookie_named(name).await
        })
        .await
    }

    pub async fn delete_cookie_named(&self, name: &str) -> Result<()> {
        self.drive(self.retry_spec(), |driver| async move {
            driver.delete_cookie(name).await
        })
        .await
    }

    pub async fn delete_cookie(&self, cookie: &Cookie) -> Result<()> {
        self.delete_cookie_named(&cookie.name).await
    }

    /// Idempotent: deleting from an empty jar succeeds
    pub async fn delete_all_cookies(&self) -> Result<()> {
        self.drive(self.retry_spec(), |driver| async move {
            driver.delete_all_cookies().await
        })
        .await
    }

    // Timeouts

    pub async fn implicit_wait(&self, timeout: Duration) -> Result<()> {
        self.set_timeouts(Timeouts {
            implicit: Some(timeout.as_millis() as u64),
            ..Default::default()
        })
        .await
    }

    pub async fn page_load_timeout(&self, timeout: Duration) -> Result<()> {
        self.set_timeouts(Timeouts {
            page_load: Some(timeout.as_millis() as u64),
            ..Default::default()
        })
        .await
    }

    pub async fn script_timeout(&self, timeout: Duration) -> Result<()> {
        self.set_timeouts(Timeouts {
            script: Some(timeout.as_millis() as u64),
            ..Default::default()
        })
        .await
    }

    async fn set_timeouts(&self, timeouts: Timeouts) -> Result<()> {
        self.drive(self.retry_spec(), |driver| async move {
            driver.set_timeouts(timeouts).await
        })
        .await
    }

    // Windows and frames

    pub async fn window_position(&self) -> Result<Point> {
        let rect = self.session()?.driver().window_rect().await?;
        Ok(Point {
            x: rect.x,
            y: rect.y,
        })
    }

    pub async fn window_size(&self) -> Result<Dimension> {
        let rect = self
            .drive(self.retry_spec(), |driver| async move {
                driver.window_rect().await
            })
            .await?;
        Ok(Dimension {
            width: rect.width,
            height: rect.height,
        })
    }

    pub async fn set_window_position(&self, x: i64, y: i64) -> Result<()> {
        self.drive(self.retry_spec(), |driver| async move {
            let rect = driver.window_rect().await?;
            driver.set_window_rect(WindowRect { x, y, ..rect }).await
        })
        .await
    }

    pub async fn set_window_size(&self, width: u64, height: u64) -> Result<()> {
        self.drive(self.retry_spec(), |driver| async move {
            let rect = driver.window_rect().await?;
            driver
                .set_window_rect(WindowRect {
                    width,
                    height,
                    ..rect
                })
                .await
        })
        .await
    }

    pub async fn maximize_window(&self) -> Result<()> {
        self.drive(self.retry_spec(), |driver| async move {
            driver.maximize_window().await
        })
        .await
    }

    /// Switch to the most recently opened window
    pub async fn switch_to_latest_window(&self) -> Result<()> {
        self.drive(self.retry_spec(), |driver| async move {
            let handles = driver.window_handles().await?;
            let latest = handles
                .last()
                .ok_or_else(|| Error::protocol("no windows open"))?;
            driver.switch_to_window(latest).await
        })
        .await
    }

    pub async fn open_window_count(&self) -> Result<usize> {
        let handles = self
            .drive(self.retry_spec(), |driver| async move {
                driver.window_handles().await
            })
            .await?;
        Ok(handles.len())
    }

    pub async fn switch_to_frame(&self, reference: &str) -> Result<()> {
        self.drive(self.retry_spec(), |driver| async move {
            driver.switch_to_frame(reference).await
        })
        .await
    }

    // Alerts

    /// Wait for a dialog to open, then accept it
    pub async fn accept_alert(&self) -> Result<()> {
        self.handle_alert(true).await
    }

    /// Wait for a dialog to open, then dismiss it
    pub async fn dismiss_alert(&self) -> Result<()> {
        self.handle_alert(false).await
    }

    async fn handle_alert(&self, accept: bool) -> Result<()> {
        let session = self.session()?;
        let wait = self.wait_for(&session)?;

        with_retry(self.retry_spec(), || {
            let session = session.clone();
            let wait = wait.clone();
            async move {
                let text = wait.wait_for_alert(&session).await?;
                debug!(alert = %text, accept, "handling alert");
                let driver = session.driver();
                if accept {
                    driver.accept_alert().await
                } else {
                    driver.dismiss_alert().await
                }
            }
        })
        .await
    }

    // Logs and scripts

    pub async fn logs(&self, log_type: LogType) -> Result<Vec<LogEntry>> {
        self.drive(self.retry_spec(), |driver| async move {
            driver.logs(log_type).await
        })
        .await
    }

    pub async fn execute_script(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        self.session()?.driver().execute_script(script, args).await
    }

    // Lifecycle

    /// End or shrink the session.
    ///
    /// `Quit` ends the browser and unbinds the session. `Close` closes the
    /// current window only: with other windows remaining the session stays
    /// bound and the caller must switch to one of them; closing the last
    /// window ends the session like `Quit`.
    #[instrument(skip(self), fields(key = %self.key()))]
    pub async fn quit(&self, mode: CloseSession) -> Result<()> {
        match mode {
            CloseSession::Quit => {
                self.drive(self.retry_spec(), |driver| async move {
                    driver.quit().await
                })
                .await?;
                self.registry.unbind(&self.key);
                info!(key = %self.key, "session quit");
            }
            CloseSession::Close => {
                let remaining = self
                    .drive(self.retry_spec(), |driver| async move {
                        driver.close_window().await
                    })
                    .await?;
                if remaining.is_empty() {
                    self.registry.unbind(&self.key);
                    info!(key = %self.key, "last window closed, session ended");
                } else {
                    debug!(key = %self.key, remaining = remaining.len(), "window closed");
                }
            }
        }
        Ok(())
    }
}
