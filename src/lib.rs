//! Drover: WebDriver action layer for UI test automation
//!
//! This library wraps the W3C WebDriver protocol with per-worker session
//! isolation, explicit-wait resolution and bounded failure-retry, so test
//! scripts can issue high-level actions (click, type, navigate, read
//! attributes) without handling page readiness or transient lookup races.

pub mod error;
pub mod config;

pub mod locator;
pub mod protocol;
pub mod session;
pub mod waits;
pub mod retry;
pub mod controller;
pub mod files;

// Re-exports
pub use config::Config;
pub use controller::{ActionController, CloseSession};
pub use error::{Error, Result};
pub use locator::{Locator, SelectorKind};
pub use retry::RetrySpec;
pub use session::{Session, SessionKey, SessionRegistry};
pub use waits::WaitCondition;

/// Drover library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
