//! Event time
//!
//! Every lifecycle event carries the logical time at which it happened at the
//! source. That time, not arrival order and not local receipt time, decides
//! which event wins for an entity.

use std::ops::{Add, Sub};
use std::time::Duration;

/// Event time - logical timestamp carried by an event
/// Represented as microseconds since the Unix epoch
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EventTime(pub i64);

impl EventTime {
    pub const ZERO: EventTime = EventTime(0);
    pub const MAX: EventTime = EventTime(i64::MAX);
    pub const MIN: EventTime = EventTime(i64::MIN);

    #[inline]
    pub const fn from_micros(micros: i64) -> Self {
        EventTime(micros)
    }

    #[inline]
    pub const fn from_millis(millis: i64) -> Self {
        EventTime(millis.saturating_mul(1000))
    }

    #[inline]
    pub fn from_unix_secs(secs: i64) -> Self {
        EventTime(secs.saturating_mul(1_000_000))
    }

    #[inline]
    pub fn as_micros(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn as_millis(self) -> i64 {
        self.0 / 1000
    }

    #[inline]
    pub fn as_unix_secs(self) -> i64 {
        self.0 / 1_000_000
    }

    /// True if `self` is strictly newer than `watermark`
    #[inline]
    pub fn is_after(self, watermark: EventTime) -> bool {
        self > watermark
    }

    #[inline]
    pub fn saturating_add(self, duration: Duration) -> Self {
        EventTime(self.0.saturating_add(duration_micros(duration)))
    }

    #[inline]
    pub fn saturating_sub(self, duration: Duration) -> Self {
        EventTime(self.0.saturating_sub(duration_micros(duration)))
    }
}

#[inline]
fn duration_micros(duration: Duration) -> i64 {
    i64::try_from(duration.as_micros()).unwrap_or(i64::MAX)
}

impl Add<Duration> for EventTime {
    type Output = EventTime;

    #[inline]
    fn add(self, rhs: Duration) -> Self::Output {
        self.saturating_add(rhs)
    }
}

impl Sub<Duration> for EventTime {
    type Output = EventTime;

    #[inline]
    fn sub(self, rhs: Duration) -> Self::Output {
        self.saturating_sub(rhs)
    }
}

impl Sub<EventTime> for EventTime {
    type Output = Duration;

    /// Distance between two event times, zero if `rhs` is later
    #[inline]
    fn sub(self, rhs: EventTime) -> Self::Output {
        let diff = self.0.saturating_sub(rhs.0);
        if diff >= 0 {
            Duration::from_micros(diff as u64)
        } else {
            Duration::ZERO
        }
    }
}

impl std::fmt::Debug for EventTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t({}ms)", self.as_millis())
    }
}

impl std::fmt::Display for EventTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}us", self.0)
    }
}
