//! The single interval-timer slot of a poll loop.
//!
//! The slot only records what the next wait should be armed for. Arming the
//! OS timer is done by the loop at the start of a blocking wait, so
//! reconfiguring the slot never races with a wait already in progress.

use crate::clock::Timestamp;
use std::time::Duration;

/// Timer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerMode {
    /// No timer; waits are purely descriptor driven.
    #[default]
    Disabled,
    /// One expiration at the given monotonic time.
    Absolute(Timestamp),
    /// Repeating expiration; each deadline is the previous one plus the period.
    Periodic(Duration),
    /// One expiration after the given delay, measured from configuration time.
    Relative(Duration),
}

/// Timer mode plus the next absolute deadline to arm.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TimerSlot {
    mode: TimerMode,
    next: Option<Timestamp>,
}

impl TimerSlot {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn mode(&self) -> TimerMode {
        self.mode
    }

    /// Deadline the next blocking wait will be armed with.
    pub(crate) fn next_deadline(&self) -> Option<Timestamp> {
        self.next
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.next.is_some()
    }

    pub(crate) fn set_absolute(&mut self, deadline: Timestamp) {
        self.mode = TimerMode::Absolute(deadline);
        self.next = Some(deadline);
    }

    pub(crate) fn set_periodic(&mut self, period: Duration, now: Timestamp) {
        self.mode = TimerMode::Periodic(period);
        self.next = Some(now.saturating_add(period));
    }

    pub(crate) fn set_relative(&mut self, delay: Duration, now: Timestamp) {
        self.mode = TimerMode::Relative(delay);
        self.next = Some(now.saturating_add(delay));
    }

    pub(crate) fn set_disabled(&mut self) {
        self.mode = TimerMode::Disabled;
        self.next = None;
    }

    /// Record that the armed deadline expired.
    ///
    /// Single-shot modes become disabled. Periodic mode moves on to
    /// `previous deadline + period`, never `now + period`, so the schedule
    /// does not accumulate per-iteration overhead. Returns the deadline
    /// that fired.
    pub(crate) fn fire(&mut self) -> Option<Timestamp> {
        let fired = self.next?;
        match self.mode {
            TimerMode::Periodic(period) => {
                self.next = Some(fired.saturating_add(period));
            }
            TimerMode::Absolute(_) | TimerMode::Relative(_) | TimerMode::Disabled => {
                self.mode = TimerMode::Disabled;
                self.next = None;
            }
        }
        Some(fired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: u64 = 1_000_000;

    #[test]
    fn test_starts_disabled() {
        let slot = TimerSlot::new();
        assert_eq!(slot.mode(), TimerMode::Disabled);
        assert!(!slot.is_enabled());
        assert_eq!(slot.next_deadline(), None);
    }

    #[test]
    fn test_absolute_is_single_shot() {
        let mut slot = TimerSlot::new();
        let deadline = Timestamp::from_nanos(5 * MS);
        slot.set_absolute(deadline);
        assert_eq!(slot.next_deadline(), Some(deadline));

        assert_eq!(slot.fire(), Some(deadline));
        assert_eq!(slot.mode(), TimerMode::Disabled);
        assert_eq!(slot.fire(), None);
    }

    #[test]
    fn test_relative_is_measured_from_configuration() {
        let mut slot = TimerSlot::new();
        slot.set_relative(Duration::from_millis(3), Timestamp::from_nanos(10 * MS));
        assert_eq!(slot.next_deadline(), Some(Timestamp::from_nanos(13 * MS)));
        assert!(slot.fire().is_some());
        assert!(!slot.is_enabled());
    }

    #[test]
    fn test_periodic_accumulates_from_previous_deadline() {
        let mut slot = TimerSlot::new();
        slot.set_periodic(Duration::from_millis(2), Timestamp::from_nanos(100 * MS));

        for n in 1..=10u64 {
            let fired = slot.fire();
            assert_eq!(fired, Some(Timestamp::from_nanos((100 + 2 * n) * MS)));
        }
        assert_eq!(slot.mode(), TimerMode::Periodic(Duration::from_millis(2)));
    }

    #[test]
    fn test_latest_configuration_wins() {
        let mut slot = TimerSlot::new();
        slot.set_periodic(Duration::from_millis(1), Timestamp::from_nanos(0));
        slot.set_absolute(Timestamp::from_nanos(42));
        assert_eq!(slot.mode(), TimerMode::Absolute(Timestamp::from_nanos(42)));

        slot.set_disabled();
        assert!(!slot.is_enabled());
        assert_eq!(slot.fire(), None);
    }
}
