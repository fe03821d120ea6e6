//! Descriptor-backed synchronisation primitives for [`rtpoll`].
//!
//! - [`FdSem`]: counting semaphore, readable while signals are pending
//! - [`AsyncMsgQ`]: multi-producer queue, readable while messages are queued
//!
//! Both implement the adapter traits of `rtpoll`, so they plug straight into
//! [`RtPoll::item_new_semaphore`](rtpoll::RtPoll::item_new_semaphore) and
//! [`RtPoll::item_new_queue`](rtpoll::RtPoll::item_new_queue).
//!
//! # Example
//!
//! ```no_run
//! use rtpoll::prelude::*;
//! use rtpoll_sync::AsyncMsgQ;
//! use std::sync::Arc;
//!
//! let queue = Arc::new(AsyncMsgQ::<u32>::new().expect("queue"));
//! let mut rtpoll = RtPoll::new();
//! rtpoll
//!     .item_new_queue(Priority::Normal, Arc::clone(&queue), |_ctx, msg| {
//!         println!("got {msg}");
//!         StageResult::Idle
//!     })
//!     .expect("item");
//!
//! queue.push(7).expect("push");
//! rtpoll.run(true).expect("run");
//! ```

#![deny(clippy::unwrap_used)]
#![deny(unused_must_use)]

pub mod asyncmsgq;
pub mod error;
pub mod fdsem;

pub use asyncmsgq::AsyncMsgQ;
pub use error::{SyncError, SyncResult};
pub use fdsem::FdSem;
