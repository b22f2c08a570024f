//! Test clock.

use basket_core::clock::Clock;
use chrono::{DateTime, Utc};

/// A clock frozen at one instant, so event timestamps and snapshot
/// `saved_at` values can be asserted exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
