//! Wall-clock abstraction used for record timestamps and freshness checks.
//!
//! Rate limiting does not go through this trait: spacing between source calls is
//! measured with the monotonic `Instant`, while freshness is measured against the
//! wall-clock timestamps stored in each record.
use chrono::{DateTime, Utc};

/// Source of "now" for the resolver.
pub trait Clock: Send + Sync {
    /// Current UTC instant.
    fn now(&self) -> DateTime<Utc>;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
