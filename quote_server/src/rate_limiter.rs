//! Global spacing between quote source invocations.
//!
//! A single `RateLimiter` is shared by every resolver call in the process. It enforces
//! a minimum wall-clock interval between two successive source calls, whatever the
//! symbol and whichever request triggered them.
//!
//! The last invocation instant lives behind a mutex and is only reachable through
//! [`RateLimiter::acquire`]. The mutex is held while the caller waits, so a second
//! caller always computes its wait from the instant the first one actually proceeded.
//! The quote cache uses its own lock and is never blocked by a waiting caller.

use log::{info, warn};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

/// Minimum-interval limiter shared by all symbols and callers.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_invocation: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a limiter that has never fired.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_invocation: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Instant>> {
        self.last_invocation.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// How long a caller arriving at `now` has to wait: `min_interval - (now - last)`,
    /// or zero when the interval has already elapsed or nothing fired yet.
    pub fn wait_time(&self, now: Instant) -> Duration {
        Self::remaining(*self.lock(), self.min_interval, now)
    }

    fn remaining(last: Option<Instant>, min_interval: Duration, now: Instant) -> Duration {
        match last {
            Some(last) => min_interval.saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }

    /// Block until the caller may invoke the source, then record that instant.
    ///
    /// Returns the instant the caller was allowed to proceed.
    pub fn acquire(&self) -> Instant {
        let mut last = self.lock();
        let wait = Self::remaining(*last, self.min_interval, Instant::now());
        if !wait.is_zero() {
            info!("Rate limit: waiting {}ms before the next fetch", wait.as_millis());
            thread::sleep(wait);
        }
        let proceed = Instant::now();
        *last = Some(proceed);
        proceed
    }
}
