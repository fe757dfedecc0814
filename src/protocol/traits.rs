//! Protocol client trait
//!
//! The action layer consumes the driver exclusively through [`DriverClient`].
//! Every call may fail with a protocol-level error; the retry policy
//! classifies those as transient or fatal via [`crate::Error::is_transient`].

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::locator::Locator;
use crate::protocol::types::{
    Cookie, Dimension, ElementHandle, LogEntry, LogType, Point, Timeouts, WindowRect,
};

/// Exclusive handle to one live browser session
#[async_trait]
pub trait DriverClient: Send + Sync + std::fmt::Debug {
    // Navigation

    async fn navigate(&self, url: &str) -> Result<()>;

    async fn current_url(&self) -> Result<String>;

    async fn back(&self) -> Result<()>;

    async fn forward(&self) -> Result<()>;

    async fn page_source(&self) -> Result<String>;

    // Element lookup

    async fn find_element(&self, locator: &Locator) -> Result<ElementHandle>;

    async fn find_elements(&self, locator: &Locator) -> Result<Vec<ElementHandle>>;

    async fn find_child_elements(
        &self,
        parent: &ElementHandle,
        locator: &Locator,
    ) -> Result<Vec<ElementHandle>>;

    // Element operations

    async fn click(&self, element: &ElementHandle) -> Result<()>;

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<()>;

    async fn clear(&self, element: &ElementHandle) -> Result<()>;

    async fn text(&self, element: &ElementHandle) -> Result<String>;

    async fn tag_name(&self, element: &ElementHandle) -> Result<String>;

    async fn attribute(&self, element: &ElementHandle, name: &str) -> Result<Option<String>>;

    async fn location(&self, element: &ElementHandle) -> Result<Point>;

    async fn size(&self, element: &ElementHandle) -> Result<Dimension>;

    async fn is_displayed(&self, element: &ElementHandle) -> Result<bool>;

    async fn is_enabled(&self, element: &ElementHandle) -> Result<bool>;

    async fn is_selected(&self, element: &ElementHandle) -> Result<bool>;

    // Script execution

    async fn execute_script(&self, script: &str, args: Vec<Value>) -> Result<Value>;

    /// Capture the visible page as raw PNG bytes
    async fn screenshot(&self) -> Result<Vec<u8>>;

    // Cookies

    async fn add_cookie(&self, cookie: Cookie) -> Result<()>;

    async fn cookies(&self) -> Result<Vec<Cookie>>;

    async fn cookie_named(&self, name: &str) -> Result<Option<Cookie>>;

    async fn delete_cookie(&self, name: &str) -> Result<()>;

    async fn delete_all_cookies(&self) -> Result<()>;

    // Timeouts

    async fn set_timeouts(&self, timeouts: Timeouts) -> Result<()>;

    // Windows and frames

    async fn window_rect(&self) -> Result<WindowRect>;

    async fn set_window_rect(&self, rect: WindowRect) -> Result<()>;

    async fn maximize_window(&self) -> Result<()>;

    async fn window_handles(&self) -> Result<Vec<String>>;

    async fn switch_to_window(&self, handle: &str) -> Result<()>;

    async fn switch_to_frame(&self, reference: &str) -> Result<()>;

    /// Close the current window/tab, returning the remaining window handles
    async fn close_window(&self) -> Result<Vec<String>>;

    /// End the browser process and the session entirely
    async fn quit(&self) -> Result<()>;

    // Alerts

    async fn alert_text(&self) -> Result<String>;

    async fn accept_alert(&self) -> Result<()>;

    async fn dismiss_alert(&self) -> Result<()>;

    // Logs

    async fn logs(&self, log_type: LogType) -> Result<Vec<LogEntry>>;
}
