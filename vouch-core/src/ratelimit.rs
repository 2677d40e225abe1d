//! Request-rate accounting for the access endpoints.
//!
//! The limiter is a black box to the rest of the subsystem: callers hand it a
//! key, a window, and a ceiling and get back an allow/deny decision with a
//! retry hint. The bundled implementation keeps fixed-window counters in
//! process memory; when running more than one replica the counters under-count
//! (each replica tracks its own share) but never over-permit a single
//! process. Swapping in a shared store only requires another [`RateLimiter`].

use std::time::{Duration, Instant};

use dashmap::DashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Seconds until the current window resets. Present only on denial.
    pub retry_after_seconds: Option<u64>,
}

impl RateLimitDecision {
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            retry_after_seconds: None,
        }
    }

    pub fn denied(retry_after: Duration) -> Self {
        Self {
            allowed: false,
            retry_after_seconds: Some(retry_after.as_secs().max(1)),
        }
    }
}

pub trait RateLimiter: Send + Sync + 'static {
    /// Record one request against `key` and decide whether it may proceed.
    fn check(&self, key: &str, window: Duration, max_requests: u32) -> RateLimitDecision;
}

struct FixedWindow {
    started_at: Instant,
    count: u32,
}

/// Process-local fixed-window counters keyed by caller identity.
#[derive(Default)]
pub struct InMemoryRateLimiter {
    windows: DashMap<String, FixedWindow>,
}

impl InMemoryRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RateLimiter for InMemoryRateLimiter {
    fn check(&self, key: &str, window: Duration, max_requests: u32) -> RateLimitDecision {
        let now = Instant::now();
        let mut entry = self
            .windows
            .entry(key.to_string())
            .or_insert_with(|| FixedWindow {
                started_at: now,
                count: 0,
            });

        let elapsed = now.duration_since(entry.started_at);
        if elapsed >= window {
            entry.started_at = now;
            entry.count = 0;
        }

        entry.count += 1;
        if entry.count <= max_requests {
            RateLimitDecision::allowed()
        } else {
            let elapsed = now.duration_since(entry.started_at);
            RateLimitDecision::denied(window.saturating_sub(elapsed))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_up_to_limit() {
        let limiter = InMemoryRateLimiter::new();
        let window = Duration::from_secs(60);

        for _ in 0..3 {
            assert!(limiter.check("ip:1.2.3.4", window, 3).allowed);
        }

        let denied = limiter.check("ip:1.2.3.4", window, 3);
        assert!(!denied.allowed);
        assert!(denied.retry_after_seconds.is_some());
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = InMemoryRateLimiter::new();
        let window = Duration::from_secs(60);

        assert!(limiter.check("ip:1.1.1.1", window, 1).allowed);
        assert!(!limiter.check("ip:1.1.1.1", window, 1).allowed);
        assert!(limiter.check("ip:2.2.2.2", window, 1).allowed);
    }

    #[test]
    fn test_window_resets() {
        let limiter = InMemoryRateLimiter::new();
        let window = Duration::from_millis(50);

        assert!(limiter.check("pair:end_1:a@b.c", window, 1).allowed);
        assert!(!limiter.check("pair:end_1:a@b.c", window, 1).allowed);

        std::thread::sleep(Duration::from_millis(60));
        assert!(limiter.check("pair:end_1:a@b.c", window, 1).allowed);
    }

    #[test]
    fn test_retry_after_never_zero() {
        let decision = RateLimitDecision::denied(Duration::from_millis(1));
        assert_eq!(decision.retry_after_seconds, Some(1));
    }
}
