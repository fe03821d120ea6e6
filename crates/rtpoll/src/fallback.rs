//! Fallback platform implementation for non-Linux unix systems.
//!
//! Without timerfd the deadline is turned into a `poll(2)` timeout, rounded
//! up to whole milliseconds so the loop never wakes before the deadline.

use crate::clock::Timestamp;
use crate::config::RtPollConfig;
use crate::error::RtPollResult;
use crate::pollfd::PollFd;

/// Deadline-tracking timer driven by the poll timeout.
#[derive(Debug, Default)]
pub(crate) struct PlatformTimer {
    deadline: Option<Timestamp>,
}

impl PlatformTimer {
    pub(crate) const BACKEND: &'static str = "poll-timeout";

    pub(crate) fn new() -> RtPollResult<Self> {
        Ok(Self::default())
    }

    pub(crate) fn arm(&mut self, deadline: Timestamp) -> RtPollResult {
        self.deadline = Some(deadline);
        Ok(())
    }

    pub(crate) fn disarm(&mut self) -> RtPollResult {
        self.deadline = None;
        Ok(())
    }

    pub(crate) fn pollfd(&self) -> Option<PollFd> {
        None
    }

    /// Milliseconds until `deadline`, rounded up; `-1` without a deadline.
    pub(crate) fn timeout_ms(&self, deadline: Option<Timestamp>) -> libc::c_int {
        let Some(deadline) = deadline else {
            return -1;
        };
        let remaining = deadline.remaining_from(Timestamp::now());
        let ms = remaining.as_nanos().div_ceil(1_000_000);
        libc::c_int::try_from(ms).unwrap_or(libc::c_int::MAX)
    }

    pub(crate) fn expired(&mut self, _entry: Option<&PollFd>) -> bool {
        let fired = self
            .deadline
            .is_some_and(|deadline| Timestamp::now() >= deadline);
        if fired {
            self.deadline = None;
        }
        fired
    }
}

/// Apply thread setup (no-op for fallback).
pub(crate) fn apply_thread_setup(config: &RtPollConfig) {
    if config.has_rt_features() {
        tracing::debug!("Thread setup is not supported on this platform, skipping");
    }
}
