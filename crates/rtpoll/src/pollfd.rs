//! Pollable descriptor entries and the `poll(2)` wrapper.

#![expect(unsafe_code, reason = "poll(2) takes a raw pointer to the descriptor array")]

use std::fmt;
use std::os::unix::io::RawFd;

/// Readable data is available.
pub const POLLIN: i16 = libc::POLLIN;
/// Writing will not block.
pub const POLLOUT: i16 = libc::POLLOUT;
/// Urgent data is available.
pub const POLLPRI: i16 = libc::POLLPRI;
/// Error condition (output only).
pub const POLLERR: i16 = libc::POLLERR;
/// Hang up (output only).
pub const POLLHUP: i16 = libc::POLLHUP;
/// Invalid descriptor (output only).
pub const POLLNVAL: i16 = libc::POLLNVAL;

/// One entry of the shared descriptor buffer.
///
/// Layout-compatible with `struct pollfd`. A fresh entry has `fd == -1`,
/// which `poll(2)` ignores.
#[derive(Clone, Copy)]
#[repr(transparent)]
pub struct PollFd(libc::pollfd);

impl PollFd {
    /// An unused entry.
    pub const EMPTY: Self = Self(libc::pollfd {
        fd: -1,
        events: 0,
        revents: 0,
    });

    /// Entry watching `fd` for `events`.
    pub const fn new(fd: RawFd, events: i16) -> Self {
        Self(libc::pollfd {
            fd,
            events,
            revents: 0,
        })
    }

    /// Watched descriptor, `-1` when unused.
    #[inline]
    pub fn fd(&self) -> RawFd {
        self.0.fd
    }

    /// Requested events.
    #[inline]
    pub fn events(&self) -> i16 {
        self.0.events
    }

    /// Events reported by the last wait.
    #[inline]
    pub fn revents(&self) -> i16 {
        self.0.revents
    }

    /// Point the entry at another descriptor.
    #[inline]
    pub fn set_fd(&mut self, fd: RawFd) {
        self.0.fd = fd;
    }

    /// Replace the requested events.
    #[inline]
    pub fn set_events(&mut self, events: i16) {
        self.0.events = events;
    }

    #[inline]
    pub(crate) fn clear_revents(&mut self) {
        self.0.revents = 0;
    }

    /// `revents` has any bit of `mask` set.
    #[inline]
    pub fn has_revents(&self, mask: i16) -> bool {
        self.0.revents & mask != 0
    }

    /// Readable, or hung up with data possibly left to read.
    #[inline]
    pub fn is_readable(&self) -> bool {
        self.has_revents(POLLIN | POLLHUP)
    }

    /// `POLLERR`, `POLLHUP` or `POLLNVAL` was reported.
    #[inline]
    pub fn is_error(&self) -> bool {
        self.has_revents(POLLERR | POLLHUP | POLLNVAL)
    }
}

impl Default for PollFd {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl PartialEq for PollFd {
    fn eq(&self, other: &Self) -> bool {
        self.0.fd == other.0.fd
            && self.0.events == other.0.events
            && self.0.revents == other.0.revents
    }
}

impl Eq for PollFd {}

impl fmt::Debug for PollFd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollFd")
            .field("fd", &self.0.fd)
            .field("events", &format_args!("{:#06x}", self.0.events))
            .field("revents", &format_args!("{:#06x}", self.0.revents))
            .finish()
    }
}

/// Block in `poll(2)` for at most `timeout_ms` (`-1` waits forever).
///
/// Returns the number of entries with non-zero `revents`, or the raw `errno`.
/// `EINTR` is reported to the caller, which decides whether to retry.
pub(crate) fn poll(fds: &mut [PollFd], timeout_ms: libc::c_int) -> Result<usize, i32> {
    let nfds = libc::nfds_t::try_from(fds.len()).map_err(|_too_many| libc::EINVAL)?;
    // SAFETY: `PollFd` is `repr(transparent)` over `libc::pollfd`, and the
    // pointer/length pair describes exactly the borrowed slice.
    let rc = unsafe { libc::poll(fds.as_mut_ptr().cast::<libc::pollfd>(), nfds, timeout_ms) };
    if rc < 0 {
        return Err(crate::RtPollError::last_os_errno());
    }
    Ok(usize::try_from(rc).unwrap_or(0))
}
