// src/clock.rs

use chrono::Utc;

/// Millisecond time source for cache expiry decisions.
/// Injected so expiry can be exercised with a synthetic clock in tests.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}
