//! Concurrency tests for the rate limiter
//!
//! Verifies that concurrent requests cannot slip past the limit through a
//! lost update between reading and writing a window record.

use rate_limiter::{RateLimiter, RateLimiterConfig};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn concurrent_requests_admit_exactly_the_limit() {
    const LIMIT: u32 = 16;
    const THREADS: usize = 32;

    let limiter = Arc::new(RateLimiter::new(RateLimiterConfig {
        limit: LIMIT,
        window_ms: 60_000,
        max_keys: 1_000,
    }));
    let barrier = Arc::new(Barrier::new(THREADS));
    let admitted = Arc::new(AtomicU32::new(0));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let limiter = Arc::clone(&limiter);
            let barrier = Arc::clone(&barrier);
            let admitted = Arc::clone(&admitted);
            thread::spawn(move || {
                barrier.wait();
                if limiter.check("shared-key") {
                    admitted.fetch_add(1, Ordering::SeqCst);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(admitted.load(Ordering::SeqCst), LIMIT);
    // The window is saturated: the next request is denied
    assert!(!limiter.check("shared-key"));
    assert_eq!(limiter.remaining("shared-key"), 0);
}

#[test]
fn sweep_count_stays_consistent_under_concurrent_inserts() {
    let limiter = Arc::new(RateLimiter::new(RateLimiterConfig {
        limit: 5,
        window_ms: 60_000,
        max_keys: 100_000,
    }));

    // Every window is live for the whole test, so each sweep must report
    // zero evictions even while new keys land mid-sweep
    let inserter = {
        let limiter = Arc::clone(&limiter);
        thread::spawn(move || {
            for i in 0..20_000u32 {
                limiter.check(&format!("client-{}", i));
            }
        })
    };

    for _ in 0..2_000 {
        assert_eq!(limiter.sweep_expired(), 0);
    }

    inserter.join().unwrap();
    assert_eq!(limiter.tracked_keys(), 20_000);
}

#[test]
fn concurrent_requests_on_distinct_keys_do_not_interfere() {
    const THREADS: usize = 8;

    let limiter = Arc::new(RateLimiter::new(RateLimiterConfig {
        limit: 1,
        window_ms: 60_000,
        max_keys: 1_000,
    }));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let limiter = Arc::clone(&limiter);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                limiter.check(&format!("client-{}", i))
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
    assert_eq!(limiter.tracked_keys(), THREADS);
}
