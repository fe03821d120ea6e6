//! Prelude module for common poll loop types.
//!
//! ```
//! use rtpoll::prelude::*;
//! ```

pub use crate::adapters::{PollableQueue, PollableSemaphore};
pub use crate::clock::Timestamp;
pub use crate::config::RtPollConfig;
pub use crate::error::{RtPollError, RtPollResult};
pub use crate::item::{ItemContext, ItemId, StageResult};
pub use crate::pollfd::{POLLERR, POLLHUP, POLLIN, POLLOUT, POLLPRI, PollFd};
pub use crate::priority::Priority;
pub use crate::rtpoll::{QuitHandle, RtPoll, RunOutcome};
pub use crate::timer::TimerMode;
