//! WebDriver protocol layer
//!
//! Narrow client interface over the W3C WebDriver wire protocol, with a real
//! HTTP implementation and a scriptable mock for tests.

pub mod traits;
pub mod types;
pub mod http;
pub mod mock;

#[cfg(test)]
mod tests;

pub use http::HttpDriver;
pub use mock::MockDriver;
pub use traits::DriverClient;
pub use types::{Cookie, Dimension, ElementHandle, LogEntry, LogType, Point, Timeouts, WindowRect};
