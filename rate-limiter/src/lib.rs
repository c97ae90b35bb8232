//! Fixed-window request rate limiting for Compass GRC
//!
//! An explicitly owned, in-process limiter consulted by the edge layer on
//! every inbound request.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod key;
pub mod limiter;

pub use key::{client_key, FALLBACK_CLIENT_KEY};
pub use limiter::{QuotaSnapshot, RateLimiter, RateLimiterConfig};
