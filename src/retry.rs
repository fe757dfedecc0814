//! Bounded retry for transiently failing actions
//!
//! Wraps a whole action invocation, wait resolution included: a retry is a
//! full re-attempt of the operation, not a partial resume. Re-invocation is
//! immediate; there is deliberately no delay or backoff.

use std::future::Future;

use tracing::warn;

use crate::error::Result;

/// Declarative retry budget for one action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrySpec {
    /// Additional attempts after the first invocation
    pub max_attempts: u32,
}

impl RetrySpec {
    /// Run the action once, never retry
    pub fn none() -> Self {
        Self { max_attempts: 0 }
    }

    pub fn attempts(max_attempts: u32) -> Self {
        Self { max_attempts }
    }
}

impl Default for RetrySpec {
    fn default() -> Self {
        Self::none()
    }
}

/// Invoke `action`, re-invoking on transient failures up to
/// `spec.max_attempts` additional times.
///
/// A transiently failing action runs at most `max_attempts + 1` times; a
/// fatal failure runs exactly once. The last failure propagates unchanged.
pub async fn with_retry<T, F, Fut>(spec: RetrySpec, mut action: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0u32;
    loop {
        match action().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < spec.max_attempts => {
                attempt += 1;
                warn!(attempt, max = spec.max_attempts, error = %e, "transient failure, retrying");
            }
            Err(e) => return Err(e),
        }
    }
}
