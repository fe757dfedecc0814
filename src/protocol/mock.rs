//! Mock WebDriver implementation for testing
//!
//! A scriptable in-memory driver: elements can be registered up-front, made
//! to appear or become interactable after a number of polls, and individual
//! protocol calls can be primed to fail. Every call is counted so tests can
//! assert how often the wire was actually hit.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::io::Cursor;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::locator::Locator;
use crate::protocol::traits::DriverClient;
use crate::protocol::types::{
    Cookie, Dimension, ElementHandle, LogEntry, LogType, Point, Timeouts, WindowRect,
};

/// Scriptable element registered with the mock
#[derive(Debug, Clone)]
pub struct MockElement {
    id: String,
    selector: String,
    parent: Option<String>,
    text: String,
    tag: String,
    attributes: HashMap<String, String>,
    location: Point,
    size: Dimension,
    displayed: bool,
    enabled: bool,
    selected: bool,
    /// Find attempts to swallow before the element "exists"
    appear_after: u32,
    /// Visibility checks to fail before the element renders
    displayed_after: u32,
    /// Enabled checks to fail before the element accepts input
    enabled_after: u32,
}

impl MockElement {
    pub fn new<S: Into<String>>(selector: S) -> Self {
        Self {
            id: String::new(),
            selector: selector.into(),
            parent: None,
            text: String::new(),
            tag: "div".to_string(),
            attributes: HashMap::new(),
            location: Point { x: 0, y: 0 },
            size: Dimension {
                width: 10,
                height: 10,
            },
            displayed: true,
            enabled: true,
            selected: false,
            appear_after: 0,
            displayed_after: 0,
            enabled_after: 0,
        }
    }

    pub fn text<S: Into<String>>(mut self, text: S) -> Self {
        self.text = text.into();
        self
    }

    pub fn tag<S: Into<String>>(mut self, tag: S) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn attr<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn at(mut self, x: i64, y: i64) -> Self {
        self.location = Point { x, y };
        self
    }

    pub fn sized(mut self, width: u64, height: u64) -> Self {
        self.size = Dimension { width, height };
        self
    }

    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn selected(mut self) -> Self {
        self.selected = true;
        self
    }

    /// Element is absent for the first `polls` find attempts
    pub fn appears_after(mut self, polls: u32) -> Self {
        self.appear_after = polls;
        self
    }

    /// Element reports not-displayed for the first `checks` visibility checks
    pub fn displayed_after(mut self, checks: u32) -> Self {
        self.displayed_after = checks;
        self
    }

    /// Element reports disabled for the first `checks` enabled checks
    pub fn enabled_after(mut self, checks: u32) -> Self {
        self.enabled_after = checks;
        self
    }
}

#[derive(Debug, Default)]
struct MockState {
    quit: bool,
    url: Option<String>,
    history: Vec<String>,
    page_source: String,
    elements: Vec<MockElement>,
    typed: HashMap<String, String>,
    clicked: Vec<String>,
    scripts: Vec<(String, Vec<Value>)>,
    script_result: Value,
    cookies: Vec<Cookie>,
    timeouts: Option<Timeouts>,
    window_rect: Option<WindowRect>,
    maximized: bool,
    windows: Vec<String>,
    current_window: Option<String>,
    current_frame: Option<String>,
    alert: Option<String>,
    alert_appear_after: u32,
    alert_outcomes: Vec<&'static str>,
    logs: HashMap<&'static str, Vec<LogEntry>>,
    screenshot_size: (u32, u32),
    calls: HashMap<&'static str, u32>,
    failures: HashMap<&'static str, VecDeque<Error>>,
}

/// Mock WebDriver client
#[derive(Debug)]
pub struct MockDriver {
    state: Mutex<MockState>,
    next_id: AtomicU64,
}

impl MockDriver {
    pub fn new() -> Self {
        let state = MockState {
            page_source: "<html><body></body></html>".to_string(),
            windows: vec!["w-1".to_string()],
            current_window: Some("w-1".to_string()),
            screenshot_size: (64, 64),
            ..Default::default()
        };
        Self {
            state: Mutex::new(state),
            next_id: AtomicU64::new(1),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state poisoned")
    }

    /// Register a top-level element, returning its handle
    pub fn add_element(&self, element: MockElement) -> ElementHandle {
        let id = format!("el-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut element = element;
        element.id = id.clone();
        self.lock().elements.push(element);
        ElementHandle(id)
    }

    /// Register an element found only as a child of `parent_selector`
    pub fn add_child(&self, parent_selector: &str, element: MockElement) -> ElementHandle {
        let id = format!("el-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut element = element;
        element.id = id.clone();
        element.parent = Some(parent_selector.to_string());
        self.lock().elements.push(element);
        ElementHandle(id)
    }

    /// Prime the next invocation of `method` to fail with `error`
    pub fn fail_once(&self, method: &'static str, error: Error) {
        self.lock()
            .failures
            .entry(method)
            .or_default()
            .push_back(error);
    }

    /// Number of times `method` reached the mock wire
    pub fn calls(&self, method: &str) -> u32 {
        self.lock().calls.get(method).copied().unwrap_or(0)
    }

    /// Open an additional browser window
    pub fn open_window<S: Into<String>>(&self, handle: S) {
        self.lock().windows.push(handle.into());
    }

    /// Present an alert dialog, optionally only after `polls` failed reads
    pub fn set_alert<S: Into<String>>(&self, text: S, appear_after: u32) {
        let mut state = self.lock();
        state.alert = Some(text.into());
        state.alert_appear_after = appear_after;
    }

    /// Accepted/dismissed alert outcomes, in order
    pub fn alert_outcomes(&self) -> Vec<&'static str> {
        self.lock().alert_outcomes.clone()
    }

    pub fn set_page_source<S: Into<String>>(&self, html: S) {
        self.lock().page_source = html.into();
    }

    pub fn set_script_result(&self, value: Value) {
        self.lock().script_result = value;
    }

    /// Scripts executed so far, as (script, args) pairs
    pub fn executed_scripts(&self) -> Vec<(String, Vec<Value>)> {
        self.lock().scripts.clone()
    }

    /// Keys typed into an element so far
    pub fn typed_into(&self, element: &ElementHandle) -> Option<String> {
        self.lock().typed.get(element.as_str()).cloned()
    }

    pub fn set_screenshot_size(&self, width: u32, height: u32) {
        self.lock().screenshot_size = (width, height);
    }

    pub fn push_log(&self, log_type: LogType, level: &str, message: &str) {
        self.lock()
            .logs
            .entry(log_type.as_str())
            .or_default()
            .push(LogEntry {
                level: level.to_string(),
                message: message.to_string(),
                timestamp: chrono::Utc::now(),
            });
    }

    pub fn current_mock_url(&self) -> Option<String> {
        self.lock().url.clone()
    }

    pub fn is_quit(&self) -> bool {
        self.lock().quit
    }

    /// Count a wire call, fail if quit or a failure was primed
    fn enter(&self, method: &'static str) -> Result<()> {
        let mut state = self.lock();
        *state.calls.entry(method).or_insert(0) += 1;
        if state.quit {
            return Err(Error::driver_gone("session already quit"));
        }
        if let Some(queue) = state.failures.get_mut(method) {
            if let Some(error) = queue.pop_front() {
                return Err(error);
            }
        }
        Ok(())
    }

    fn selector_of(locator: &Locator) -> Result<String> {
        Ok(locator.to_wire()?.1)
    }
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! with_element {
    ($state:expr, $handle:expr) => {
        $state
            .elements
            .iter_mut()
            .find(|e| e.id == $handle.as_str())
            .ok_or_else(|| Error::stale_element($handle.as_str()))
    };
}

#[async_trait]
impl DriverClient for MockDriver {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.enter("navigate")?;
        let mut state = self.lock();
        if let Some(current) = state.url.take() {
            state.history.push(current);
        }
        state.url = Some(url.to_string());
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        self.enter("current_url")?;
        self.lock()
            .url
            .clone()
            .ok_or_else(|| Error::protocol("no page loaded"))
    }

    async fn back(&self) -> Result<()> {
        self.enter("back")?;
        let mut state = self.lock();
        if let Some(previous) = state.history.pop() {
            state.url = Some(previous);
        }
        Ok(())
    }

    async fn forward(&self) -> Result<()> {
        self.enter("forward")?;
        Ok(())
    }

    async fn page_source(&self) -> Result<String> {
        self.enter("page_source")?;
        Ok(self.lock().page_source.clone())
    }

    async fn find_element(&self, locator: &Locator) -> Result<ElementHandle> {
        self.enter("find_element")?;
        if let Locator::Resolved(handle) = locator {
            return Ok(handle.clone());
        }
        let selector = Self::selector_of(locator)?;
        let mut state = self.lock();
        let element = state
            .elements
            .iter_mut()
            .find(|e| e.selector == selector && e.parent.is_none())
            .ok_or_else(|| Error::element_not_found(&selector))?;
        if element.appear_after > 0 {
            element.appear_after -= 1;
            return Err(Error::element_not_found(&selector));
        }
        Ok(ElementHandle(element.id.clone()))
    }

    async fn find_elements(&self, locator: &Locator) -> Result<Vec<ElementHandle>> {
        self.enter("find_elements")?;
        if let Locator::Resolved(handle) = locator {
            return Ok(vec![handle.clone()]);
        }
        let selector = Self::selector_of(locator)?;
        let state = self.lock();
        Ok(state
            .elements
            .iter()
            .filter(|e| e.selector == selector && e.parent.is_none() && e.appear_after == 0)
            .map(|e| ElementHandle(e.id.clone()))
            .collect())
    }

    async fn find_child_elements(
        &self,
        parent: &ElementHandle,
        locator: &Locator,
    ) -> Result<Vec<ElementHandle>> {
        self.enter("find_child_elements")?;
        let selector = Self::selector_of(locator)?;
        let state = self.lock();
        let parent_selector = state
            .elements
            .iter()
            .find(|e| e.id == parent.as_str())
            .map(|e| e.selector.clone())
            .ok_or_else(|| Error::stale_element(parent.as_str()))?;
        Ok(state
            .elements
            .iter()
            .filter(|e| e.parent.as_deref() == Some(parent_selector.as_str()) && e.selector == selector)
            .map(|e| ElementHandle(e.id.clone()))
            .collect())
    }

    async fn click(&self, element: &ElementHandle) -> Result<()> {
        self.enter("click")?;
        let mut state = self.lock();
        let target = with_element!(state, element)?;
        if !target.enabled {
            return Err(Error::not_interactable(element.as_str()));
        }
        let id = target.id.clone();
        state.clicked.push(id);
        Ok(())
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<()> {
        self.enter("send_keys")?;
        let mut state = self.lock();
        with_element!(state, element)?;
        state
            .typed
            .entry(element.as_str().to_string())
            .or_default()
            .push_str(text);
        Ok(())
    }

    async fn clear(&self, element: &ElementHandle) -> Result<()> {
        self.enter("clear")?;
        let mut state = self.lock();
        with_element!(state, element)?;
        state.typed.remove(element.as_str());
        Ok(())
    }

    async fn text(&self, element: &ElementHandle) -> Result<String> {
        self.enter("text")?;
        let mut state = self.lock();
        Ok(with_element!(state, element)?.text.clone())
    }

    async fn tag_name(&self, element: &ElementHandle) -> Result<String> {
        self.enter("tag_name")?;
        let mut state = self.lock();
        Ok(with_element!(state, element)?.tag.clone())
    }

    async fn attribute(&self, element: &ElementHandle, name: &str) -> Result<Option<String>> {
        self.enter("attribute")?;
        let mut state = self.lock();
        Ok(with_element!(state, element)?.attributes.get(name).cloned())
    }

    async fn location(&self, element: &ElementHandle) -> Result<Point> {
        self.enter("location")?;
        let mut state = self.lock();
        Ok(with_element!(state, element)?.location)
    }

    async fn size(&self, element: &ElementHandle) -> Result<Dimension> {
        self.enter("size")?;
        let mut state = self.lock();
        Ok(with_element!(state, element)?.size)
    }

    async fn is_displayed(&self, element: &ElementHandle) -> Result<bool> {
        self.enter("is_displayed")?;
        let mut state = self.lock();
        let target = with_element!(state, element)?;
        if target.displayed_after > 0 {
            target.displayed_after -= 1;
            return Ok(false);
        }
        Ok(target.displayed)
    }

    async fn is_enabled(&self, element: &ElementHandle) -> Result<bool> {
        self.enter("is_enabled")?;
        let mut state = self.lock();
        let target = with_element!(state, element)?;
        if target.enabled_after > 0 {
            target.enabled_after -= 1;
            return Ok(false);
        }
        Ok(target.enabled)
    }

    async fn is_selected(&self, element: &ElementHandle) -> Result<bool> {
        self.enter("is_selected")?;
        let mut state = self.lock();
        Ok(with_element!(state, element)?.selected)
    }

    async fn execute_script(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        self.enter("execute_script")?;
        let mut state = self.lock();
        state.scripts.push((script.to_string(), args));
        Ok(state.script_result.clone())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        self.enter("screenshot")?;
        let (width, height) = self.lock().screenshot_size;
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 200, 200, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
            .map_err(|e| Error::image(format!("mock screenshot encode: {}", e)))?;
        Ok(bytes)
    }

    async fn add_cookie(&self, cookie: Cookie) -> Result<()> {
        self.enter("add_cookie")?;
        let mut state = self.lock();
        state.cookies.retain(|c| c.name != cookie.name);
        state.cookies.push(cookie);
        Ok(())
    }

    async fn cookies(&self) -> Result<Vec<Cookie>> {
        self.enter("cookies")?;
        Ok(self.lock().cookies.clone())
    }

    async fn cookie_named(&self, name: &str) -> Result<Option<Cookie>> {
        self.enter("cookie_named")?;
        Ok(self.lock().cookies.iter().find(|c| c.name == name).cloned())
    }

    async fn delete_cookie(&self, name: &str) -> Result<()> {
        self.enter("delete_cookie")?;
        self.lock().cookies.retain(|c| c.name != name);
        Ok(())
    }

    async fn delete_all_cookies(&self) -> Result<()> {
        self.enter("delete_all_cookies")?;
        self.lock().cookies.clear();
        Ok(())
    }

    async fn set_timeouts(&self, timeouts: Timeouts) -> Result<()> {
        self.enter("set_timeouts")?;
        self.lock().timeouts = Some(timeouts);
        Ok(())
    }

    async fn window_rect(&self) -> Result<WindowRect> {
        self.enter("window_rect")?;
        Ok(self.lock().window_rect.unwrap_or(WindowRect {
            x: 0,
            y: 0,
            width: 1920,
            height: 1080,
        }))
    }

    async fn set_window_rect(&self, rect: WindowRect) -> Result<()> {
        self.enter("set_window_rect")?;
        self.lock().window_rect = Some(rect);
        Ok(())
    }

    async fn maximize_window(&self) -> Result<()> {
        self.enter("maximize_window")?;
        self.lock().maximized = true;
        Ok(())
    }

    async fn window_handles(&self) -> Result<Vec<String>> {
        self.enter("window_handles")?;
        Ok(self.lock().windows.clone())
    }

    async fn switch_to_window(&self, handle: &str) -> Result<()> {
        self.enter("switch_to_window")?;
        let mut state = self.lock();
        if !state.windows.iter().any(|w| w == handle) {
            return Err(Error::protocol(format!("no such window: {}", handle)));
        }
        state.current_window = Some(handle.to_string());
        Ok(())
    }

    async fn switch_to_frame(&self, reference: &str) -> Result<()> {
        self.enter("switch_to_frame")?;
        self.lock().current_frame = Some(reference.to_string());
        Ok(())
    }

    async fn close_window(&self) -> Result<Vec<String>> {
        self.enter("close_window")?;
        let mut state = self.lock();
        let current = state
            .current_window
            .take()
            .ok_or_else(|| Error::protocol("no current window"))?;
        state.windows.retain(|w| *w != current);
        if state.windows.is_empty() {
            state.quit = true;
        }
        Ok(state.windows.clone())
    }

    async fn quit(&self) -> Result<()> {
        self.enter("quit")?;
        let mut state = self.lock();
        state.quit = true;
        state.windows.clear();
        state.current_window = None;
        Ok(())
    }

    async fn alert_text(&self) -> Result<String> {
        self.enter("alert_text")?;
        let mut state = self.lock();
        if state.alert_appear_after > 0 {
            state.alert_appear_after -= 1;
            return Err(Error::NoAlertOpen("alert not open yet".to_string()));
        }
        state
            .alert
            .clone()
            .ok_or_else(|| Error::NoAlertOpen("no alert present".to_string()))
    }

    async fn accept_alert(&self) -> Result<()> {
        self.enter("accept_alert")?;
        let mut state = self.lock();
        if state.alert.take().is_none() {
            return Err(Error::NoAlertOpen("no alert present".to_string()));
        }
        state.alert_outcomes.push("accepted");
        Ok(())
    }

    async fn dismiss_alert(&self) -> Result<()> {
        self.enter("dismiss_alert")?;
        let mut state = self.lock();
        if state.alert.take().is_none() {
            return Err(Error::NoAlertOpen("no alert present".to_string()));
        }
        state.alert_outcomes.push("dismissed");
        Ok(())
    }

    async fn logs(&self, log_type: LogType) -> Result<Vec<LogEntry>> {
        self.enter("logs")?;
        Ok(self
            .lock()
            .logs
            .get(log_type.as_str())
            .cloned()
            .unwrap_or_default())
    }
}
