//! Bounded polling: the core reliability idiom.
//!
//! UI state changes asynchronously, so single-shot checks are flaky. The
//! retry engine converts eventual consistency into a deterministic pass/fail
//! at the timeout boundary: a predicate is evaluated repeatedly, sleeping a
//! fixed interval between attempts, until it holds or the timeout elapses.
//! Timeout and interval are first-class configuration so worst-case run time
//! can be reasoned about.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::{EngineError, EngineResult};

/// Timeout and poll interval for one bounded wait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total time budget in milliseconds. Zero means evaluate exactly once.
    pub timeout_ms: u64,

    /// Sleep between attempts in milliseconds. Must be nonzero.
    pub poll_interval_ms: u64,
}

impl RetryPolicy {
    pub const fn new(timeout_ms: u64, poll_interval_ms: u64) -> Self {
        Self {
            timeout_ms,
            poll_interval_ms,
        }
    }

    /// Policy from the global configuration defaults
    pub fn from_config() -> Self {
        let cfg = config::get();
        Self::new(cfg.defaults.timeout_ms, cfg.defaults.poll_interval_ms)
    }

    /// Short policy used for settle-checks (viewport, navigation readiness)
    pub fn settle() -> Self {
        let cfg = config::get();
        Self::new(cfg.defaults.settle_timeout_ms, cfg.defaults.poll_interval_ms)
    }

    /// Check `timeout_ms >= poll_interval_ms > 0` (zero timeout is the
    /// single-shot special case and always valid)
    pub fn validate(&self) -> EngineResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(EngineError::ScenarioLoad(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.timeout_ms != 0 && self.timeout_ms < self.poll_interval_ms {
            return Err(EngineError::ScenarioLoad(format!(
                "timeout_ms ({}) must be at least poll_interval_ms ({})",
                self.timeout_ms, self.poll_interval_ms
            )));
        }
        Ok(())
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config()
    }
}

/// One predicate evaluation: satisfied, or pending with the observed state
///
/// Pending detail is carried through to the timeout error so a failed wait
/// reports the last thing it saw, not just "timed out".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Poll {
    /// The condition holds
    Satisfied,

    /// Not yet; the string describes what was observed instead
    Pending(String),
}

impl Poll {
    /// Build a poll outcome from a boolean plus an observation
    pub fn from_bool(satisfied: bool, observed: impl Into<String>) -> Self {
        if satisfied {
            Poll::Satisfied
        } else {
            Poll::Pending(observed.into())
        }
    }
}

/// Evaluate `predicate` until it is satisfied or the policy's timeout
/// elapses.
///
/// The predicate is always evaluated at least once, immediately. Predicate
/// faults (an `Err` return, e.g. the surface transiently absent) count as
/// "not yet true" rather than propagating; only a timeout with the predicate
/// never satisfied is reported, as [`EngineError::AssertionTimeout`] carrying
/// the last observation and attempt count.
pub fn wait_until<F>(policy: RetryPolicy, mut predicate: F) -> EngineResult<()>
where
    F: FnMut() -> EngineResult<Poll>,
{
    let timeout = Duration::from_millis(policy.timeout_ms);
    let interval = Duration::from_millis(policy.poll_interval_ms);
    let start = Instant::now();
    let mut attempts: u32 = 0;
    let mut last_observed = String::from("predicate not yet evaluated");

    loop {
        attempts += 1;
        match predicate() {
            Ok(Poll::Satisfied) => return Ok(()),
            Ok(Poll::Pending(observed)) => last_observed = observed,
            // Transient faults are "not yet true" until the timeout
            Err(err) => last_observed = format!("predicate fault: {}", err),
        }

        if policy.timeout_ms == 0 || start.elapsed() >= timeout {
            tracing::debug!(
                timeout_ms = policy.timeout_ms,
                attempts,
                last_observed = %last_observed,
                "wait_until timed out"
            );
            return Err(EngineError::AssertionTimeout {
                timeout_ms: policy.timeout_ms,
                attempts,
                last_observed,
            });
        }
        std::thread::sleep(interval);
    }
}
