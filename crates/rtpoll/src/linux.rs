//! Linux-specific platform implementation.
//!
//! The interval timer is a `timerfd` on CLOCK_MONOTONIC armed with absolute
//! deadlines. Its descriptor is polled alongside the item descriptors, so a
//! single `poll(2)` call wakes on either, with hrtimer resolution and no
//! signal handling.

#![expect(unsafe_code, reason = "timerfd and scheduler syscalls")]

use crate::clock::Timestamp;
use crate::config::RtPollConfig;
use crate::error::{RtPollError, RtPollResult};
use crate::pollfd::{POLLIN, PollFd};
use libc::{
    CLOCK_MONOTONIC, MCL_CURRENT, MCL_FUTURE, SCHED_FIFO, TFD_CLOEXEC, TFD_NONBLOCK,
    TFD_TIMER_ABSTIME, itimerspec, timespec,
};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};

const ZERO: timespec = timespec {
    tv_sec: 0,
    tv_nsec: 0,
};

/// timerfd-backed interval timer.
#[derive(Debug)]
pub(crate) struct PlatformTimer {
    fd: OwnedFd,
    armed: bool,
}

impl PlatformTimer {
    pub(crate) const BACKEND: &'static str = "timerfd";

    pub(crate) fn new() -> RtPollResult<Self> {
        // SAFETY: plain syscall with constant flags; the result is checked below.
        let raw = unsafe { libc::timerfd_create(CLOCK_MONOTONIC, TFD_NONBLOCK | TFD_CLOEXEC) };
        if raw < 0 {
            return Err(RtPollError::TimerArm {
                errno: RtPollError::last_os_errno(),
            });
        }
        // SAFETY: `raw` is a freshly created descriptor owned by nobody else.
        let fd = unsafe { OwnedFd::from_raw_fd(raw) };
        Ok(Self { fd, armed: false })
    }

    /// Arm for one expiration at `deadline`. A deadline in the past expires
    /// immediately.
    pub(crate) fn arm(&mut self, deadline: Timestamp) -> RtPollResult {
        // An all-zero it_value would disarm instead.
        let deadline = deadline.max(Timestamp::from_nanos(1));
        self.settime(deadline.to_timespec())?;
        self.armed = true;
        Ok(())
    }

    pub(crate) fn disarm(&mut self) -> RtPollResult {
        if !self.armed {
            return Ok(());
        }
        self.settime(ZERO)?;
        self.armed = false;
        Ok(())
    }

    /// Extra entry to append to the poll set.
    pub(crate) fn pollfd(&self) -> Option<PollFd> {
        Some(PollFd::new(self.fd.as_raw_fd(), POLLIN))
    }

    /// The timerfd wakes the poll, so the poll itself never times out.
    pub(crate) fn timeout_ms(&self, _deadline: Option<Timestamp>) -> libc::c_int {
        -1
    }

    /// Consume the expiration count if the timerfd fired.
    pub(crate) fn expired(&mut self, entry: Option<&PollFd>) -> bool {
        if !entry.is_some_and(PollFd::is_readable) {
            return false;
        }

        let mut ticks: u64 = 0;
        // SAFETY: reads at most 8 bytes into a live, properly aligned u64.
        let n = unsafe {
            libc::read(
                self.fd.as_raw_fd(),
                (&raw mut ticks).cast::<libc::c_void>(),
                std::mem::size_of::<u64>(),
            )
        };
        let fired = n == 8 && ticks > 0;
        if fired {
            self.armed = false;
        }
        fired
    }

    fn settime(&self, value: timespec) -> RtPollResult {
        let new_value = itimerspec {
            it_interval: ZERO,
            it_value: value,
        };
        let flags = if value.tv_sec == 0 && value.tv_nsec == 0 {
            0
        } else {
            TFD_TIMER_ABSTIME
        };
        // SAFETY: `new_value` outlives the call and the old-value pointer may be null.
        let rc = unsafe {
            libc::timerfd_settime(self.fd.as_raw_fd(), flags, &new_value, std::ptr::null_mut())
        };
        if rc != 0 {
            return Err(RtPollError::TimerArm {
                errno: RtPollError::last_os_errno(),
            });
        }
        Ok(())
    }
}

/// Apply Linux-specific thread setup to the calling thread.
///
/// Every step is best effort; failures are logged and skipped.
pub(crate) fn apply_thread_setup(config: &RtPollConfig) {
    if let Some(priority) = config.realtime_priority {
        let param = libc::sched_param {
            sched_priority: priority,
        };
        // SAFETY: `param` is valid for the duration of the call and
        // pthread_self() always names the calling thread.
        let rc = unsafe { libc::pthread_setschedparam(libc::pthread_self(), SCHED_FIFO, &param) };
        if rc != 0 {
            tracing::warn!(
                priority,
                errno = rc,
                "Failed to enable SCHED_FIFO, continuing without RT priority"
            );
        }
    }

    if config.lock_memory {
        // SAFETY: plain syscall with constant flags.
        let rc = unsafe { libc::mlockall(MCL_CURRENT | MCL_FUTURE) };
        if rc != 0 {
            tracing::warn!(
                errno = RtPollError::last_os_errno(),
                "mlockall failed, pages may fault inside the loop"
            );
        }
    }

    if let Some(mask) = config.cpu_affinity {
        // SAFETY: cpu_set_t is a plain bit array; all-zero is the empty set.
        let mut set: libc::cpu_set_t = unsafe { std::mem::zeroed() };
        for cpu in (0..64usize).filter(|cpu| mask & (1u64 << cpu) != 0) {
            // SAFETY: `cpu` < 64, well inside CPU_SETSIZE.
            unsafe { libc::CPU_SET(cpu, &mut set) };
        }
        // SAFETY: `set` is initialised and its exact size is passed.
        let rc = unsafe {
            libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &set)
        };
        if rc != 0 {
            tracing::warn!(
                mask,
                errno = RtPollError::last_os_errno(),
                "Failed to set CPU affinity"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_timer_fires_for_past_deadline() -> Result<(), Box<dyn std::error::Error>> {
        let mut timer = PlatformTimer::new()?;
        timer.arm(Timestamp::now())?;

        let mut fds = [timer.pollfd().unwrap_or_default()];
        let ready = crate::pollfd::poll(&mut fds, 1_000).map_err(std::io::Error::from_raw_os_error)?;
        assert_eq!(ready, 1);
        assert!(timer.expired(fds.first()));
        Ok(())
    }

    #[test]
    fn test_disarmed_timer_stays_quiet() -> Result<(), Box<dyn std::error::Error>> {
        let mut timer = PlatformTimer::new()?;
        timer.arm(Timestamp::now().saturating_add(Duration::from_millis(5)))?;
        timer.disarm()?;

        let mut fds = [timer.pollfd().unwrap_or_default()];
        let ready = crate::pollfd::poll(&mut fds, 20).map_err(std::io::Error::from_raw_os_error)?;
        assert_eq!(ready, 0);
        assert!(!timer.expired(fds.first()));
        Ok(())
    }

    #[test]
    fn test_thread_setup_without_features_is_noop() {
        apply_thread_setup(&RtPollConfig::testing());
    }
}
