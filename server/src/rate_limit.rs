//! In-memory rate limiting for public offer submissions.
//!
//! DESIGN
//! ======
//! Sliding-window counters backed by `HashMap<String, VecDeque<Instant>>`,
//! keyed by client address. The offer form is the only unauthenticated write,
//! so it is the only route that passes through here.
//!
//! Limits come from `RATE_LIMIT_OFFERS` (default 5) per
//! `RATE_LIMIT_OFFER_WINDOW_SECS` (default 600).

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::config::env_parse;

const DEFAULT_OFFER_LIMIT: usize = 5;
const DEFAULT_OFFER_WINDOW_SECS: u64 = 600;

#[derive(Debug, thiserror::Error)]
#[error("rate limit exceeded (max {limit} submissions/{window_secs}s)")]
pub struct RateLimitError {
    pub limit: usize,
    pub window_secs: u64,
}

#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<HashMap<String, VecDeque<Instant>>>>,
    limit: usize,
    window: Duration,
}

impl RateLimiter {
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(
            env_parse("RATE_LIMIT_OFFERS", DEFAULT_OFFER_LIMIT),
            Duration::from_secs(env_parse("RATE_LIMIT_OFFER_WINDOW_SECS", DEFAULT_OFFER_WINDOW_SECS)),
        )
    }

    #[must_use]
    pub fn with_limits(limit: usize, window: Duration) -> Self {
        Self { inner: Arc::new(Mutex::new(HashMap::new())), limit, window }
    }

    /// Check the key's window, then record the attempt.
    pub fn check_and_record(&self, key: &str) -> Result<(), RateLimitError> {
        self.check_and_record_at(key, Instant::now())
    }

    fn check_and_record_at(&self, key: &str, now: Instant) -> Result<(), RateLimitError> {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        // Drop keys whose windows have fully drained so the map stays bounded.
        inner.retain(|_, deque| {
            prune_window(deque, now, self.window);
            !deque.is_empty()
        });

        let deque = inner.entry(key.to_owned()).or_default();
        if deque.len() >= self.limit {
            return Err(RateLimitError { limit: self.limit, window_secs: self.window.as_secs() });
        }
        deque.push_back(now);
        Ok(())
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

fn prune_window(deque: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&front) = deque.front() {
        if now.duration_since(front) > window {
            deque.pop_front();
        } else {
            break;
        }
    }
}

#[cfg(test)]
#[path = "rate_limit_test.rs"]
mod tests;
