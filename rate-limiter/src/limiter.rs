//! Fixed-window request counter keyed by client identity
//!
//! A fixed-window counter resets at window boundaries rather than sliding
//! continuously, so a burst straddling a boundary can admit up to twice the
//! configured limit across the two windows. That imprecision is accepted
//! here in exchange for constant-time checks and a single small record per
//! key.
//!
//! The limiter never fails a request on its own fault: when its map is at
//! capacity and a sweep frees nothing, it admits (fails open) rather than
//! denying all traffic.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Rate limiter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimiterConfig {
    /// Maximum requests per key per window
    pub limit: u32,

    /// Window duration in milliseconds
    pub window_ms: i64,

    /// Maximum number of tracked keys before expired records are swept
    pub max_keys: usize,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            limit: 100,
            window_ms: 60_000,
            max_keys: 10_000,
        }
    }
}

/// Counter state for one key's current window
#[derive(Debug, Clone)]
struct WindowRecord {
    count: u32,
    window_reset_at: DateTime<Utc>,
}

/// Quota state reported to clients via X-RateLimit-* response headers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaSnapshot {
    /// Configured per-window request limit
    pub limit: u32,

    /// Requests left in the current window
    pub remaining: u32,

    /// When the current window ends
    pub reset_at: DateTime<Utc>,
}

/// Fixed-window rate limiter
///
/// One record per distinct key, created lazily on the first request in a
/// window and replaced when the window expires. Shared across request
/// handlers via `Arc`; all record updates go through the map's entry API so
/// two concurrent requests cannot both read a stale count.
pub struct RateLimiter {
    config: RateLimiterConfig,
    // Map: client key -> current window record
    records: Arc<DashMap<String, WindowRecord>>,
}

impl RateLimiter {
    /// Create new rate limiter
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            records: Arc::new(DashMap::new()),
        }
    }

    /// Check a request against the configured limit and window
    pub fn check(&self, key: &str) -> bool {
        self.check_with(key, self.config.limit, self.config.window_ms)
    }

    /// Check a request against a per-route limit and window
    pub fn check_with(&self, key: &str, limit: u32, window_ms: i64) -> bool {
        self.check_at(key, limit, window_ms, Utc::now())
    }

    fn check_at(&self, key: &str, limit: u32, window_ms: i64, now: DateTime<Utc>) -> bool {
        if !self.records.contains_key(key) && self.records.len() >= self.config.max_keys {
            self.sweep_expired_at(now);
            if self.records.len() >= self.config.max_keys {
                warn!("Rate limiter at capacity ({} keys), admitting without counting", self.config.max_keys);
                return true;
            }
        }

        let mut entry = self
            .records
            .entry(key.to_string())
            .or_insert_with(|| WindowRecord {
                count: 0,
                window_reset_at: now + Duration::milliseconds(window_ms),
            });
        let record = entry.value_mut();

        if now > record.window_reset_at {
            record.count = 1;
            record.window_reset_at = now + Duration::milliseconds(window_ms);
            return true;
        }

        record.count += 1;
        let admitted = record.count <= limit;
        if !admitted {
            debug!("Rate limit exceeded for key {}: {} > {}", key, record.count, limit);
        }
        admitted
    }

    /// Requests left in the current window for a key; the full limit for
    /// unknown or expired keys
    pub fn remaining(&self, key: &str) -> u32 {
        self.remaining_at(key, Utc::now())
    }

    fn remaining_at(&self, key: &str, now: DateTime<Utc>) -> u32 {
        match self.records.get(key) {
            Some(record) if now <= record.window_reset_at => {
                self.config.limit.saturating_sub(record.count)
            }
            _ => self.config.limit,
        }
    }

    /// Quota state for response headers
    pub fn quota(&self, key: &str) -> QuotaSnapshot {
        let now = Utc::now();
        let reset_at = match self.records.get(key) {
            Some(record) if now <= record.window_reset_at => record.window_reset_at,
            _ => now + Duration::milliseconds(self.config.window_ms),
        };

        QuotaSnapshot {
            limit: self.config.limit,
            remaining: self.remaining_at(key, now),
            reset_at,
        }
    }

    /// Remove records whose window has ended; returns the number removed
    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(Utc::now())
    }

    fn sweep_expired_at(&self, now: DateTime<Utc>) -> usize {
        // Counted inside the closure: a before/after len() diff can go
        // negative when other threads insert keys mid-sweep
        let mut removed = 0usize;
        self.records.retain(|_, record| {
            let live = now <= record.window_reset_at;
            if !live {
                removed += 1;
            }
            live
        });
        if removed > 0 {
            debug!("Swept {} expired rate-limit windows", removed);
        }
        removed
    }

    /// Spawn a background task that sweeps expired windows on an interval.
    /// The task runs until the returned handle is aborted at shutdown.
    pub fn spawn_sweeper(self: &Arc<Self>, every: std::time::Duration) -> tokio::task::JoinHandle<()> {
        let limiter = Arc::clone(self);
        info!("Starting rate-limit sweeper (every {:?})", every);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                limiter.sweep_expired();
            }
        })
    }

    /// Clear the record for a key (e.g., for testing or manual reset)
    pub fn reset_key(&self, key: &str) {
        self.records.remove(key);
    }

    /// Number of currently tracked keys
    pub fn tracked_keys(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_limiter(limit: u32, window_ms: i64, max_keys: usize) -> RateLimiter {
        RateLimiter::new(RateLimiterConfig {
            limit,
            window_ms,
            max_keys,
        })
    }

    #[test]
    fn test_sixth_request_in_window_denied() {
        let limiter = make_limiter(5, 60_000, 100);
        let now = Utc::now();

        for _ in 0..5 {
            assert!(limiter.check_at("10.0.0.1", 5, 60_000, now));
        }
        assert!(!limiter.check_at("10.0.0.1", 5, 60_000, now));
    }

    #[test]
    fn test_window_expiry_resets_count() {
        let limiter = make_limiter(5, 60_000, 100);
        let now = Utc::now();

        for _ in 0..6 {
            limiter.check_at("10.0.0.1", 5, 60_000, now);
        }
        assert!(!limiter.check_at("10.0.0.1", 5, 60_000, now));

        // First request after the window has elapsed is admitted with a
        // fresh count
        let later = now + Duration::milliseconds(60_001);
        assert!(limiter.check_at("10.0.0.1", 5, 60_000, later));
        assert_eq!(limiter.remaining_at("10.0.0.1", later), 4);
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = make_limiter(2, 60_000, 100);
        let now = Utc::now();

        assert!(limiter.check_at("10.0.0.1", 2, 60_000, now));
        assert!(limiter.check_at("10.0.0.1", 2, 60_000, now));
        assert!(!limiter.check_at("10.0.0.1", 2, 60_000, now));

        assert!(limiter.check_at("10.0.0.2", 2, 60_000, now));
    }

    #[test]
    fn test_remaining_and_quota() {
        let limiter = make_limiter(10, 60_000, 100);
        let now = Utc::now();

        assert_eq!(limiter.remaining_at("10.0.0.1", now), 10);

        limiter.check_at("10.0.0.1", 10, 60_000, now);
        limiter.check_at("10.0.0.1", 10, 60_000, now);
        limiter.check_at("10.0.0.1", 10, 60_000, now);
        assert_eq!(limiter.remaining_at("10.0.0.1", now), 7);

        let quota = limiter.quota("10.0.0.1");
        assert_eq!(quota.limit, 10);
        assert_eq!(quota.remaining, 7);
        assert!(quota.reset_at > now);

        // Denied requests still consume nothing below zero
        let exhausted = make_limiter(1, 60_000, 100);
        exhausted.check_at("k", 1, 60_000, now);
        exhausted.check_at("k", 1, 60_000, now);
        exhausted.check_at("k", 1, 60_000, now);
        assert_eq!(exhausted.remaining_at("k", now), 0);
    }

    #[test]
    fn test_sweep_removes_expired_windows() {
        let limiter = make_limiter(5, 1_000, 100);
        let now = Utc::now();

        limiter.check_at("a", 5, 1_000, now);
        limiter.check_at("b", 5, 1_000, now);
        assert_eq!(limiter.tracked_keys(), 2);

        let later = now + Duration::milliseconds(1_500);
        limiter.check_at("c", 5, 1_000, later);

        assert_eq!(limiter.sweep_expired_at(later), 2);
        assert_eq!(limiter.tracked_keys(), 1);
    }

    #[test]
    fn test_capacity_triggers_sweep_then_fails_open() {
        let limiter = make_limiter(5, 1_000, 2);
        let now = Utc::now();

        limiter.check_at("a", 5, 1_000, now);
        limiter.check_at("b", 5, 1_000, now);
        assert_eq!(limiter.tracked_keys(), 2);

        // Map full of live windows: the fresh key is admitted but untracked
        assert!(limiter.check_at("c", 5, 1_000, now));
        assert_eq!(limiter.tracked_keys(), 2);

        // Once the old windows expire, the capacity check sweeps them and
        // the new key is tracked normally
        let later = now + Duration::milliseconds(1_500);
        assert!(limiter.check_at("c", 5, 1_000, later));
        assert_eq!(limiter.tracked_keys(), 1);
    }

    #[tokio::test]
    async fn test_sweeper_evicts_expired_windows() {
        let limiter = Arc::new(make_limiter(5, 1, 100));
        limiter.check("a");
        limiter.check("b");
        assert_eq!(limiter.tracked_keys(), 2);

        let handle = limiter.spawn_sweeper(std::time::Duration::from_millis(5));
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(limiter.tracked_keys(), 0);
        handle.abort();
    }

    #[test]
    fn test_reset_key() {
        let limiter = make_limiter(1, 60_000, 100);
        let now = Utc::now();

        limiter.check_at("10.0.0.1", 1, 60_000, now);
        assert!(!limiter.check_at("10.0.0.1", 1, 60_000, now));

        limiter.reset_key("10.0.0.1");
        assert!(limiter.check_at("10.0.0.1", 1, 60_000, now));
    }
}
