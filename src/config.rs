//! Configuration management for Drover

use crate::{Error, Result};
use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Action-layer configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// WebDriver endpoint (e.g. "http://localhost:4444")
    pub webdriver_url: String,

    /// Explicit-wait timeout in milliseconds
    pub wait_timeout_ms: u64,

    /// Polling interval for wait strategies in milliseconds
    pub poll_interval_ms: u64,

    /// Default additional attempts for retried actions
    pub retry_attempts: u32,

    /// Wait strategy alias bound to new sessions
    pub wait_strategy: String,

    /// Directory for screenshot and download artifacts
    pub artifact_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:4444".to_string(),
            wait_timeout_ms: 5000,
            poll_interval_ms: 100,
            retry_attempts: 1,
            wait_strategy: "polling".to_string(),
            artifact_dir: "target/artifacts".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(url) = env::var("DROVER_WEBDRIVER_URL") {
            config.webdriver_url = url;
        }

        if let Ok(timeout) = env::var("DROVER_WAIT_TIMEOUT_MS") {
            config.wait_timeout_ms = timeout
                .parse()
                .map_err(|_| Error::configuration("Invalid DROVER_WAIT_TIMEOUT_MS"))?;
        }

        if let Ok(interval) = env::var("DROVER_POLL_INTERVAL_MS") {
            config.poll_interval_ms = interval
                .parse()
                .map_err(|_| Error::configuration("Invalid DROVER_POLL_INTERVAL_MS"))?;
        }

        if let Ok(attempts) = env::var("DROVER_RETRY_ATTEMPTS") {
            config.retry_attempts = attempts
                .parse()
                .map_err(|_| Error::configuration("Invalid DROVER_RETRY_ATTEMPTS"))?;
        }

        if let Ok(strategy) = env::var("DROVER_WAIT_STRATEGY") {
            config.wait_strategy = strategy;
        }

        if let Ok(dir) = env::var("DROVER_ARTIFACT_DIR") {
            config.artifact_dir = dir;
        }

        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::configuration(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::configuration(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Explicit-wait timeout as a [`Duration`]
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    /// Polling interval as a [`Duration`]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
