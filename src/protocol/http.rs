//! W3C WebDriver wire client
//!
//! Speaks the WebDriver HTTP protocol against a running driver (geckodriver,
//! chromedriver, or a Selenium grid node). One [`HttpDriver`] owns exactly
//! one remote session.

use async_trait::async_trait;
use base64::Engine;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::locator::Locator;
use crate::protocol::traits::DriverClient;
use crate::protocol::types::{
    Cookie, Dimension, ElementHandle, LogEntry, LogType, Point, Timeouts, WindowRect, ELEMENT_KEY,
};

/// HTTP WebDriver client bound to one remote session
#[derive(Debug)]
pub struct HttpDriver {
    http: reqwest::Client,
    base_url: String,
    session_id: String,
}

impl HttpDriver {
    /// Start a new WebDriver session against `base_url`
    pub async fn new_session(base_url: &str, capabilities: Value) -> Result<Self> {
        let http = reqwest::Client::new();
        let body = json!({ "capabilities": { "alwaysMatch": capabilities } });

        let response: Value = http
            .post(format!("{}/session", base_url.trim_end_matches('/')))
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        let value = unwrap_value(response)?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::protocol("Session response missing sessionId"))?
            .to_string();

        debug!(session_id = %session_id, "WebDriver session created");

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session_id,
        })
    }

    /// Remote session id
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Issue one session-scoped command and unwrap the `value` payload
    async fn cmd(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let url = if path.is_empty() {
            format!("{}/session/{}", self.base_url, self.session_id)
        } else {
            format!("{}/session/{}/{}", self.base_url, self.session_id, path)
        };

        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(&body);
        } else {
            // Drivers reject bodyless POSTs without a JSON content type
            request = request.json(&json!({}));
        }

        let response: Value = request.send().await?.json().await?;
        unwrap_value(response)
    }

    async fn element_cmd(
        &self,
        method: Method,
        element: &ElementHandle,
        suffix: &str,
        body: Option<Value>,
    ) -> Result<Value> {
        let path = if suffix.is_empty() {
            format!("element/{}", element)
        } else {
            format!("element/{}/{}", element, suffix)
        };
        self.cmd(method, &path, body).await
    }
}

/// Unwrap a wire response: success carries `value`, failure carries
/// `value.error`/`value.message` per the W3C error framing.
fn unwrap_value(response: Value) -> Result<Value> {
    let value = response
        .get("value")
        .cloned()
        .ok_or_else(|| Error::protocol("Response missing value field"))?;

    if let Some(code) = value.get("error").and_then(Value::as_str) {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default();
        return Err(Error::from_webdriver(code, message));
    }

    Ok(value)
}

/// Extract an element handle from a wire element object
fn decode_element(value: &Value) -> Result<ElementHandle> {
    value
        .get(ELEMENT_KEY)
        .and_then(Value::as_str)
        .map(ElementHandle::from)
        .ok_or_else(|| Error::protocol("Response missing element identifier"))
}

fn wire_locator(locator: &Locator) -> Result<Value> {
    let (using, value) = locator.to_wire()?;
    Ok(json!({ "using": using, "value": value }))
}

#[async_trait]
impl DriverClient for HttpDriver {
    #[instrument(skip(self))]
    async fn navigate(&self, url: &str) -> Result<()> {
        self.cmd(Method::POST, "url", Some(json!({ "url": url })))
            .await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        let value = self.cmd(Method::GET, "url", None).await?;
        as_string(value)
    }

    async fn back(&self) -> Result<()> {
        self.cmd(Method::POST, "back", None).await?;
        Ok(())
    }

    async fn forward(&self) -> Result<()> {
        self.cmd(Method::POST, "forward", None).await?;
        Ok(())
    }

    async fn page_source(&self) -> Result<String> {
        let value = self.cmd(Method::GET, "source", None).await?;
        as_string(value)
    }

    #[instrument(skip(self))]
    async fn find_element(&self, locator: &Locator) -> Result<ElementHandle> {
        if let Locator::Resolved(handle) = locator {
            return Ok(handle.clone());
        }
        let value = self
            .cmd(Method::POST, "element", Some(wire_locator(locator)?))
            .await?;
        decode_element(&value)
    }

    async fn find_elements(&self, locator: &Locator) -> Result<Vec<ElementHandle>> {
        if let Locator::Resolved(handle) = locator {
            return Ok(vec![handle.clone()]);
        }
        let value = self
            .cmd(Method::POST, "elements", Some(wire_locator(locator)?))
            .await?;
        decode_elements(&value)
    }

    async fn find_child_elements(
        &self,
        parent: &ElementHandle,
        locator: &Locator,
    ) -> Result<Vec<ElementHandle>> {
        let value = self
            .element_cmd(Method::POST, parent, "elements", Some(wire_locator(locator)?))
            .await?;
        decode_elements(&value)
    }

    #[instrument(skip(self))]
    async fn click(&self, element: &ElementHandle) -> Result<()> {
        self.element_cmd(Method::POST, element, "click", None).await?;
        Ok(())
    }

    #[instrument(skip(self, text))]
    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<()> {
        self.element_cmd(
            Method::POST,
            element,
            "value",
            Some(json!({ "text": text })),
        )
        .await?;
        Ok(())
    }

    async fn clear(&self, element: &ElementHandle) -> Result<()> {
        self.element_cmd(Method::POST, element, "clear", None).await?;
        Ok(())
    }

    async fn text(&self, element: &ElementHandle) -> Result<String> {
        let value = self.element_cmd(Method::GET, element, "text", None).await?;
        as_string(value)
    }

    async fn tag_name(&self, element: &ElementHandle) -> Result<String> {
        let value = self.element_cmd(Method::GET, element, "name", None).await?;
        as_string(value)
    }

    async fn attribute(&self, element: &ElementHandle, name: &str) -> Result<Option<String>> {
        let value = self
            .element_cmd(Method::GET, element, &format!("attribute/{}", name), None)
            .await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn location(&self, element: &ElementHandle) -> Result<Point> {
        let value = self.element_cmd(Method::GET, element, "rect", None).await?;
        Ok(Point {
            x: value.get("x").and_then(Value::as_f64).unwrap_or(0.0) as i64,
            y: value.get("y").and_then(Value::as_f64).unwrap_or(0.0) as i64,
        })
    }

    async fn size(&self, element: &ElementHandle) -> Result<Dimension> {
        let value = self.element_cmd(Method::GET, element, "rect", None).await?;
        Ok(Dimension {
            width: value.get("width").and_then(Value::as_f64).unwrap_or(0.0) as u64,
            height: value.get("height").and_then(Value::as_f64).unwrap_or(0.0) as u64,
        })
    }

    async fn is_displayed(&self, element: &ElementHandle) -> Result<bool> {
        // Not in the W3C core but implemented by the mainstream drivers
        let value = self
            .element_cmd(Method::GET, element, "displayed", None)
            .await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn is_enabled(&self, element: &ElementHandle) -> Result<bool> {
        let value = self.element_cmd(Method::GET, element, "enabled", None).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn is_selected(&self, element: &ElementHandle) -> Result<bool> {
        let value = self
            .element_cmd(Method::GET, element, "selected", None)
            .await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    #[instrument(skip(self, script, args))]
    async fn execute_script(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        self.cmd(
            Method::POST,
            "execute/sync",
            Some(json!({ "script": script, "args": args })),
        )
        .await
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        let value = self.cmd(Method::GET, "screenshot", None).await?;
        let encoded = value
            .as_str()
            .ok_or_else(|| Error::protocol("Screenshot response is not a string"))?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| Error::protocol(format!("Screenshot payload is not base64: {}", e)))
    }

    async fn add_cookie(&self, cookie: Cookie) -> Result<()> {
        self.cmd(Method::POST, "cookie", Some(json!({ "cookie": cookie })))
            .await?;
        Ok(())
    }

    async fn cookies(&self) -> Result<Vec<Cookie>> {
        let value = self.cmd(Method::GET, "cookie", None).await?;
        serde_json::from_value(value).map_err(Error::from)
    }

    async fn cookie_named(&self, name: &str) -> Result<Option<Cookie>> {
        match self
            .cmd(Method::GET, &format!("cookie/{}", name), None)
            .await
        {
            Ok(value) => Ok(Some(serde_json::from_value(value)?)),
            Err(Error::Protocol(msg)) if msg.starts_with("no such cookie") => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn delete_cookie(&self, name: &str) -> Result<()> {
        self.cmd(Method::DELETE, &format!("cookie/{}", name), None)
            .await?;
        Ok(())
    }

    async fn delete_all_cookies(&self) -> Result<()> {
        self.cmd(Method::DELETE, "cookie", None).await?;
        Ok(())
    }

    async fn set_timeouts(&self, timeouts: Timeouts) -> Result<()> {
        self.cmd(
            Method::POST,
            "timeouts",
            Some(serde_json::to_value(timeouts)?),
        )
        .await?;
        Ok(())
    }

    async fn window_rect(&self) -> Result<WindowRect> {
        let value = self.cmd(Method::GET, "window/rect", None).await?;
        serde_json::from_value(value).map_err(Error::from)
    }

    async fn set_window_rect(&self, rect: WindowRect) -> Result<()> {
        self.cmd(Method::POST, "window/rect", Some(serde_json::to_value(rect)?))
            .await?;
        Ok(())
    }

    async fn maximize_window(&self) -> Result<()> {
        self.cmd(Method::POST, "window/maximize", None).await?;
        Ok(())
    }

    async fn window_handles(&self) -> Result<Vec<String>> {
        let value = self.cmd(Method::GET, "window/handles", None).await?;
        serde_json::from_value(value).map_err(Error::from)
    }

    async fn switch_to_window(&self, handle: &str) -> Result<()> {
        self.cmd(Method::POST, "window", Some(json!({ "handle": handle })))
            .await?;
        Ok(())
    }

    async fn switch_to_frame(&self, reference: &str) -> Result<()> {
        // Frames are addressed by name or id; resolve to an element first
        let frame = self
            .find_element(&Locator::css(format!(
                "frame[name=\"{0}\"], iframe[name=\"{0}\"], frame[id=\"{0}\"], iframe[id=\"{0}\"]",
                reference
            )))
            .await?;
        self.cmd(
            Method::POST,
            "frame",
            Some(json!({ "id": { ELEMENT_KEY: frame.as_str() } })),
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn close_window(&self) -> Result<Vec<String>> {
        let value = self.cmd(Method::DELETE, "window", None).await?;
        serde_json::from_value(value).map_err(Error::from)
    }

    #[instrument(skip(self))]
    async fn quit(&self) -> Result<()> {
        let url = format!("{}/session/{}", self.base_url, self.session_id);
        let response: Value = self.http.delete(url).send().await?.json().await?;
        unwrap_value(response)?;
        Ok(())
    }

    async fn alert_text(&self) -> Result<String> {
        let value = self.cmd(Method::GET, "alert/text", None).await?;
        as_string(value)
    }

    async fn accept_alert(&self) -> Result<()> {
        self.cmd(Method::POST, "alert/accept", None).await?;
        Ok(())
    }

    async fn dismiss_alert(&self) -> Result<()> {
        self.cmd(Method::POST, "alert/dismiss", None).await?;
        Ok(())
    }

    async fn logs(&self, log_type: LogType) -> Result<Vec<LogEntry>> {
        // Selenium extension endpoint; geckodriver without a grid rejects it
        let value = self
            .cmd(Method::POST, "se/log", Some(json!({ "type": log_type.as_str() })))
            .await?;

        let raw: Vec<Value> = serde_json::from_value(value)?;
        Ok(raw
            .into_iter()
            .map(|entry| LogEntry {
                level: entry
                    .get("level")
                    .and_then(Value::as_str)
                    .unwrap_or("INFO")
                    .to_string(),
                message: entry
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                timestamp: entry
                    .get("timestamp")
                    .and_then(Value::as_i64)
                    .and_then(DateTime::<Utc>::from_timestamp_millis)
                    .unwrap_or_else(Utc::now),
            })
            .collect())
    }
}

fn as_string(value: Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| Error::protocol("Expected a string response value"))
}

fn decode_elements(value: &Value) -> Result<Vec<ElementHandle>> {
    value
        .as_array()
        .ok_or_else(|| Error::protocol("Expected an element array"))?
        .iter()
        .map(decode_element)
        .collect()
}
