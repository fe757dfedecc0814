//! Unified error types for Drover

use std::time::Duration;
use thiserror::Error;

use crate::waits::WaitCondition;

/// Unified Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for Drover
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Action invoked with no bound session for the calling worker
    #[error("No active session: {0}")]
    NoActiveSession(String),

    /// A session is already bound for the worker identity
    #[error("Session already bound: {0}")]
    DuplicateSession(String),

    /// Wait precondition never satisfied within the configured timeout
    #[error("Wait for {condition} on {locator} timed out after {elapsed:?}")]
    WaitTimeout {
        locator: String,
        condition: WaitCondition,
        elapsed: Duration,
    },

    /// Element not found (transient: the page may still be mutating)
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Stale element reference (transient)
    #[error("Stale element reference: {0}")]
    StaleElement(String),

    /// Element temporarily not interactable (transient)
    #[error("Element not interactable: {0}")]
    NotInteractable(String),

    /// No alert currently open (transient: it may appear on re-poll)
    #[error("No alert open: {0}")]
    NoAlertOpen(String),

    /// Malformed selector (fatal)
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// Driver process crashed, disconnected, or the session was terminated (fatal)
    #[error("Driver gone: {0}")]
    DriverGone(String),

    /// Other protocol-level failure (fatal)
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Screenshot decode/crop failure
    #[error("Image error: {0}")]
    Image(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new no-active-session error
    pub fn no_active_session<S: Into<String>>(key: S) -> Self {
        Error::NoActiveSession(key.into())
    }

    /// Create a new duplicate-session error
    pub fn duplicate_session<S: Into<String>>(key: S) -> Self {
        Error::DuplicateSession(key.into())
    }

    /// Create a new element-not-found error
    pub fn element_not_found<S: Into<String>>(locator: S) -> Self {
        Error::ElementNotFound(locator.into())
    }

    /// Create a new stale-element error
    pub fn stale_element<S: Into<String>>(msg: S) -> Self {
        Error::StaleElement(msg.into())
    }

    /// Create a new not-interactable error
    pub fn not_interactable<S: Into<String>>(msg: S) -> Self {
        Error::NotInteractable(msg.into())
    }

    /// Create a new invalid-selector error
    pub fn invalid_selector<S: Into<String>>(msg: S) -> Self {
        Error::InvalidSelector(msg.into())
    }

    /// Create a new driver-gone error
    pub fn driver_gone<S: Into<String>>(msg: S) -> Self {
        Error::DriverGone(msg.into())
    }

    /// Create a new protocol error
    pub fn protocol<S: Into<String>>(msg: S) -> Self {
        Error::Protocol(msg.into())
    }

    /// Create a new image error
    pub fn image<S: Into<String>>(msg: S) -> Self {
        Error::Image(msg.into())
    }

    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Error::Configuration(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Error::Internal(msg.into())
    }

    /// Whether an immediate re-attempt of the failing action can succeed.
    ///
    /// This is the single classification point consulted by the retry
    /// wrapper. Wait timeouts count as retryable: a declared retry re-runs
    /// the full wait, which may succeed on a page that finished mutating.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::ElementNotFound(_)
                | Error::StaleElement(_)
                | Error::NotInteractable(_)
                | Error::NoAlertOpen(_)
                | Error::WaitTimeout { .. }
        )
    }

    /// Map a W3C WebDriver error code to the matching variant
    pub fn from_webdriver<S: Into<String>>(code: &str, message: S) -> Self {
        let message = message.into();
        match code {
            "no such element" => Error::ElementNotFound(message),
            "stale element reference" => Error::StaleElement(message),
            "element not interactable" | "element click intercepted" => {
                Error::NotInteractable(message)
            }
            "no such alert" => Error::NoAlertOpen(message),
            "invalid selector" | "invalid argument" => Error::InvalidSelector(message),
            "invalid session id" | "session not created" | "unknown command" => {
                Error::DriverGone(message)
            }
            _ => Error::Protocol(format!("{}: {}", code, message)),
        }
    }
}
