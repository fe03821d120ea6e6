//! Cross-thread message queue with a pollable wake-up descriptor.

use crate::error::SyncResult;
use crate::fdsem::FdSem;
use crossbeam::queue::SegQueue;
use rtpoll::PollableQueue;
use std::os::unix::io::RawFd;

/// Multi-producer message queue drained by a poll loop.
///
/// Producers `push` from any thread. The consumer polls
/// [`descriptor`](AsyncMsgQ::descriptor) and pops with
/// [`try_pop`](AsyncMsgQ::try_pop), which never blocks.
///
/// # RT Safety
///
/// `try_pop` is lock-free. `push` may allocate a new queue segment, so
/// producers should not be real-time threads that forbid allocation.
#[derive(Debug)]
pub struct AsyncMsgQ<M> {
    queue: SegQueue<M>,
    signal: FdSem,
}

impl<M> AsyncMsgQ<M> {
    /// Create an empty queue.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Create`](crate::SyncError::Create) if the wake-up
    /// descriptor cannot be set up.
    pub fn new() -> SyncResult<Self> {
        Ok(Self {
            queue: SegQueue::new(),
            signal: FdSem::new()?,
        })
    }

    /// Enqueue a message and wake the consumer.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Post`](crate::SyncError::Post) if the wake-up
    /// could not be signalled. The message stays queued.
    pub fn push(&self, message: M) -> SyncResult {
        self.queue.push(message);
        self.signal.post()
    }

    /// Take the next message, if any.
    pub fn try_pop(&self) -> Option<M> {
        if let Some(message) = self.queue.pop() {
            self.signal.acknowledge();
            return Some(message);
        }

        // Wake-ups can outnumber messages if a previous pop raced a push.
        let stray = self.signal.drain();
        if stray > 0 {
            tracing::trace!(stray, "Drained stray wake-ups");
        }
        self.queue.pop()
    }

    /// Number of queued messages.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// The descriptor to poll for `POLLIN`.
    pub fn descriptor(&self) -> RawFd {
        self.signal.descriptor()
    }
}

impl<M: Send> PollableQueue for AsyncMsgQ<M> {
    type Message = M;

    fn descriptor(&self) -> RawFd {
        AsyncMsgQ::descriptor(self)
    }

    fn try_pop(&self) -> Option<M> {
        AsyncMsgQ::try_pop(self)
    }

    fn before_poll(&self) -> bool {
        !self.is_empty()
    }
}
