//! Value objects mirrored from the WebDriver protocol
//!
//! These pass through the action layer unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// W3C element identifier key in wire payloads
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Opaque reference to a live element held by the driver
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementHandle(pub String);

impl ElementHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wire representation usable as a script argument
    pub fn to_wire_json(&self) -> serde_json::Value {
        serde_json::json!({ ELEMENT_KEY: self.0 })
    }
}

impl From<&str> for ElementHandle {
    fn from(id: &str) -> Self {
        ElementHandle(id.to_string())
    }
}

impl From<String> for ElementHandle {
    fn from(id: String) -> Self {
        ElementHandle(id)
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// On-page location in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

/// Rendered size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub width: u64,
    pub height: u64,
}

impl Dimension {
    pub fn is_zero(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Browser window geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRect {
    pub x: i64,
    pub y: i64,
    pub width: u64,
    pub height: u64,
}

/// Browser cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default)]
    pub secure: bool,
    #[serde(rename = "httpOnly", default)]
    pub http_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<i64>,
}

impl Cookie {
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: None,
            domain: None,
            secure: false,
            http_only: false,
            expiry: None,
        }
    }
}

/// Session timeout configuration, all fields in milliseconds
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeouts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implicit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_load: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<u64>,
}

/// Driver log channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogType {
    Browser,
    Driver,
    Performance,
    Client,
}

impl LogType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogType::Browser => "browser",
            LogType::Driver => "driver",
            LogType::Performance => "performance",
            LogType::Client => "client",
        }
    }
}

/// Single driver log record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}
