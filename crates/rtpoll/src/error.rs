//! Error types for the poll loop.

/// Errors surfaced by [`RtPoll`](crate::RtPoll) and its item operations.
///
/// The type is `Copy` and carries only raw `errno` values so it can be
/// returned from the RT path without allocating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RtPollError {
    /// The blocking wait failed for a reason other than `EINTR`.
    #[error("poll() failed (errno {errno})")]
    PollSyscall {
        /// OS error number reported by the wait.
        errno: i32,
    },

    /// Creating, arming or disarming the interval timer failed.
    #[error("failed to arm interval timer (errno {errno})")]
    TimerArm {
        /// OS error number reported by the timer call.
        errno: i32,
    },

    /// The item was released, or belongs to another poll loop.
    #[error("invalid or released rtpoll item")]
    InvalidItem,

    /// The poll loop was used from a thread other than the one it is installed on,
    /// or a second poll loop was installed on an already-bound thread.
    #[error("rtpoll used outside of its owning thread")]
    ThreadAffinityViolation,
}

impl RtPollError {
    /// Whether the loop should stop after seeing this error.
    ///
    /// Syscall failures are fatal to the loop; the remaining kinds are
    /// programming errors that leave the loop itself intact.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RtPollError::PollSyscall { .. } | RtPollError::TimerArm { .. }
        )
    }

    /// OS error number, if the error originated from a syscall.
    pub fn errno(&self) -> Option<i32> {
        match self {
            RtPollError::PollSyscall { errno } | RtPollError::TimerArm { errno } => Some(*errno),
            RtPollError::InvalidItem | RtPollError::ThreadAffinityViolation => None,
        }
    }

    pub(crate) fn last_os_errno() -> i32 {
        std::io::Error::last_os_error()
            .raw_os_error()
            .unwrap_or(libc::EIO)
    }
}

/// RT-safe result type
pub type RtPollResult<T = ()> = Result<T, RtPollError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(RtPollError::PollSyscall { errno: libc::EBADF }.is_fatal());
        assert!(RtPollError::TimerArm { errno: libc::ENOMEM }.is_fatal());
        assert!(!RtPollError::InvalidItem.is_fatal());
        assert!(!RtPollError::ThreadAffinityViolation.is_fatal());
    }

    #[test]
    fn test_errno_accessor() {
        assert_eq!(
            RtPollError::PollSyscall { errno: libc::EBADF }.errno(),
            Some(libc::EBADF)
        );
        assert_eq!(RtPollError::InvalidItem.errno(), None);
    }

    #[test]
    fn test_display_mentions_errno() {
        let s = RtPollError::TimerArm { errno: 12 }.to_string();
        assert!(s.contains("12"));
    }
}
