//! Retry pacing shared by the upload and analysis loops.
//!
//! Sleeping goes through the `Sleeper` trait so the retry state machines are
//! unit-testable without real delays.

use std::sync::Mutex;
use std::time::Duration;

use regex::Regex;

use crate::config;

/// Fixed short delay before retrying transient failures and unparsable
/// responses. The fix there is "ask again", not "wait for quota".
pub const TRANSIENT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Blocking sleep abstraction (allows mocking).
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Production sleeper. Blocks the sole workflow thread, which is the
/// intended behavior — nothing else is running.
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Test sleeper that records requested delays instead of waiting.
pub struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self {
            slept: Mutex::new(Vec::new()),
        }
    }

    pub fn recorded(&self) -> Vec<Duration> {
        self.slept.lock().unwrap().clone()
    }
}

impl Default for RecordingSleeper {
    fn default() -> Self {
        Self::new()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
    }
}

/// Attempt caps and delays for one retry loop.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first (N >= 1).
    pub max_attempts: usize,
    /// Base delay for exponential backoff after a rate-limit response.
    pub base_delay: Duration,
    /// Fixed delay for transient errors and unparsable responses.
    pub transient_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(10),
            transient_delay: TRANSIENT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Policy from environment overrides (MAX_RETRIES, RATE_LIMIT_DELAY).
    pub fn from_env() -> Self {
        Self {
            max_attempts: config::max_retries().max(1),
            base_delay: config::rate_limit_delay(),
            transient_delay: TRANSIENT_RETRY_DELAY,
        }
    }

    /// Backoff delay after the rate-limited attempt `attempt` (0-based):
    /// `base * 2^attempt`. A remote-suggested interval replaces the base.
    pub fn rate_limit_delay(&self, attempt: usize, suggested: Option<Duration>) -> Duration {
        let base = suggested.unwrap_or(self.base_delay);
        base * 2u32.saturating_pow(attempt as u32)
    }
}

/// Parse a remote-suggested retry interval out of a quota-error body.
///
/// Quota errors embed `retry_delay { seconds: 30 }`; anything else yields
/// `None` and the configured base delay applies.
pub fn suggested_retry_interval(body: &str) -> Option<Duration> {
    if !body.contains("retry_delay") {
        return None;
    }
    let pattern = Regex::new(r"seconds:\s*(\d+)").unwrap();
    let secs: u64 = pattern.captures(body)?.get(1)?.as_str().parse().ok()?;
    Some(Duration::from_secs(secs))
}
