//! Real-time poll loop for audio-style processing threads.
//!
//! An [`RtPoll`] multiplexes a dynamic set of *items* on one thread. Each
//! item owns a slot of `pollfd` descriptors and up to three callbacks that
//! run in a fixed stage order every iteration:
//!
//! - **before**: prepare for the wait; returning `Pending` skips it
//! - **after**: react to descriptor readiness once the wait returns
//! - **work**: do the actual processing; returning `Pending` asks the caller
//!   to run the next iteration without sleeping
//!
//! Items are served in `(priority, registration order)`. A single interval
//! timer (absolute, periodic or relative) bounds every wait, and periodic
//! deadlines advance by exactly one period so the loop does not drift.
//!
//! # RT-Safety Guarantees
//!
//! - **No heap allocations** inside [`RtPoll::run`] once the item set is stable
//! - **No locks** on the loop path; quit is a single atomic flag
//! - **EINTR** is absorbed inside the wait
//! - **Thread affinity** is checked, not assumed
//!
//! # Example
//!
//! ```no_run
//! use rtpoll::prelude::*;
//! use std::time::Duration;
//!
//! let mut rtpoll = RtPoll::with_config(RtPollConfig::realtime(70));
//! rtpoll.install().expect("install failed");
//! rtpoll
//!     .set_timer_periodic(Duration::from_millis(1))
//!     .expect("timer failed");
//!
//! let tick = rtpoll.item_new(Priority::Normal, 0).expect("item failed");
//! rtpoll
//!     .set_work_callback(tick, |ctx: &mut ItemContext<'_>| {
//!         if ctx.timer_elapsed() {
//!             // Render one period of audio here
//!         }
//!         StageResult::Idle
//!     })
//!     .expect("callback failed");
//!
//! rtpoll.run_until_quit().expect("poll loop failed");
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]

pub mod adapters;
pub mod clock;
pub mod config;
pub mod error;
pub mod item;
pub mod pollfd;
pub mod priority;
pub mod rtpoll;
pub mod stats;
pub mod timer;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(not(target_os = "linux"))]
mod fallback;

pub mod prelude;

pub use adapters::{PollableQueue, PollableSemaphore};
pub use clock::Timestamp;
pub use config::RtPollConfig;
pub use error::{RtPollError, RtPollResult};
pub use item::{AfterFn, BeforeFn, ItemContext, ItemId, StageResult, WorkFn};
pub use pollfd::PollFd;
pub use priority::Priority;
pub use rtpoll::{QuitHandle, RtPoll, RunOutcome};
pub use stats::WakeupStats;
pub use timer::TimerMode;
