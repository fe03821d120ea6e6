//! Monotonic timestamps.
//!
//! The poll loop arms its timer with absolute deadlines on `CLOCK_MONOTONIC`.
//! `std::time::Instant` cannot be converted to a `timespec`, so deadlines are
//! carried as nanoseconds on that clock instead.

#![expect(unsafe_code, reason = "clock_gettime has no safe std equivalent")]

use std::fmt;
use std::time::Duration;

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// A point in time on the monotonic clock, in nanoseconds.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Current monotonic time.
    pub fn now() -> Self {
        let mut ts = libc::timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };
        // SAFETY: `ts` is a valid, writable timespec and CLOCK_MONOTONIC is
        // always available on supported targets.
        let rc = unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts) };
        if rc != 0 {
            return Self(0);
        }
        Self::from_timespec(&ts)
    }

    /// Build a timestamp from raw nanoseconds on the monotonic clock.
    #[inline]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    /// Nanoseconds on the monotonic clock.
    #[inline]
    pub const fn as_nanos(self) -> u64 {
        self.0
    }

    /// `self + duration`, saturating at the end of the representable range.
    pub fn saturating_add(self, duration: Duration) -> Self {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        Self(self.0.saturating_add(nanos))
    }

    /// Time elapsed from `earlier` to `self`, or zero if `earlier` is later.
    pub fn saturating_duration_since(self, earlier: Timestamp) -> Duration {
        Duration::from_nanos(self.0.saturating_sub(earlier.0))
    }

    /// Time left until `self` as seen from `now`, or zero if already passed.
    pub fn remaining_from(self, now: Timestamp) -> Duration {
        self.saturating_duration_since(now)
    }

    pub(crate) fn from_timespec(ts: &libc::timespec) -> Self {
        let secs = u64::try_from(ts.tv_sec).unwrap_or(0);
        let nanos = u64::try_from(ts.tv_nsec).unwrap_or(0);
        Self(secs.saturating_mul(NANOS_PER_SEC).saturating_add(nanos))
    }

    #[cfg_attr(not(target_os = "linux"), expect(dead_code, reason = "timerfd only"))]
    pub(crate) fn to_timespec(self) -> libc::timespec {
        let secs = self.0 / NANOS_PER_SEC;
        let nanos = self.0 % NANOS_PER_SEC;
        libc::timespec {
            tv_sec: libc::time_t::try_from(secs).unwrap_or(libc::time_t::MAX),
            tv_nsec: libc::c_long::try_from(nanos).unwrap_or(0),
        }
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0 / NANOS_PER_SEC;
        let nanos = self.0 % NANOS_PER_SEC;
        write!(f, "Timestamp({secs}.{nanos:09}s)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_is_monotonic() {
        let a = Timestamp::now();
        let b = Timestamp::now();
        assert!(b >= a);
        assert!(a.as_nanos() > 0);
    }

    #[test]
    fn test_saturating_arithmetic() {
        let t = Timestamp::from_nanos(1_000);
        assert_eq!(t.saturating_add(Duration::from_nanos(500)).as_nanos(), 1_500);
        assert_eq!(
            Timestamp::from_nanos(u64::MAX).saturating_add(Duration::from_secs(1)),
            Timestamp::from_nanos(u64::MAX)
        );
        assert_eq!(
            t.saturating_duration_since(Timestamp::from_nanos(2_000)),
            Duration::ZERO
        );
        assert_eq!(
            Timestamp::from_nanos(2_500).remaining_from(t),
            Duration::from_nanos(1_500)
        );
    }

    #[test]
    fn test_timespec_conversion() {
        let t = Timestamp::from_nanos(3 * NANOS_PER_SEC + 250);
        let ts = t.to_timespec();
        assert_eq!(ts.tv_sec, 3);
        assert_eq!(ts.tv_nsec, 250);
        assert_eq!(Timestamp::from_timespec(&ts), t);
    }
}
