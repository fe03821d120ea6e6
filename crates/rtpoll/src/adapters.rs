//! Bridges from descriptor-backed synchronisation primitives to poll items.
//!
//! A semaphore or message queue that exposes a pollable descriptor can be
//! plugged into a loop with one call. The adapter owns an `Arc` of the
//! primitive, registers its descriptor in a one-entry slot, and wires the
//! three stages:
//!
//! - before: report `Pending` if work is already queued, so the wait is skipped
//! - after: hand readiness back to the primitive
//! - work: consume what arrived and pass it to the user handler

use crate::error::RtPollResult;
use crate::item::{ItemContext, ItemId, StageResult};
use crate::pollfd::{POLLIN, PollFd};
use crate::priority::Priority;
use crate::rtpoll::RtPoll;
use std::os::unix::io::RawFd;
use std::sync::Arc;

/// A counting signal whose pending state is visible through a descriptor.
pub trait PollableSemaphore: Send + Sync {
    /// Descriptor that becomes readable while a signal is pending.
    fn descriptor(&self) -> RawFd;

    /// Consume one pending signal. Returns `false` if none was pending.
    fn acknowledge(&self) -> bool;

    /// Called before the wait; `true` means a signal is already pending.
    fn before_poll(&self) -> bool {
        false
    }

    /// Called after the wait.
    fn after_poll(&self) {}
}

/// A message queue whose non-empty state is visible through a descriptor.
pub trait PollableQueue: Send + Sync {
    /// Queued message type.
    type Message;

    /// Descriptor that becomes readable while messages are queued.
    fn descriptor(&self) -> RawFd;

    /// Take the next message without blocking.
    fn try_pop(&self) -> Option<Self::Message>;

    /// Called before the wait; `true` means messages are already queued.
    fn before_poll(&self) -> bool {
        false
    }

    /// Called after the wait.
    fn after_poll(&self) {}
}

impl RtPoll {
    /// Register an item that waits on `semaphore`.
    ///
    /// Each iteration in which a signal is consumed calls `on_signal` once;
    /// its result becomes the item's work result.
    ///
    /// # Errors
    ///
    /// [`RtPollError::ThreadAffinityViolation`](crate::RtPollError::ThreadAffinityViolation)
    /// when called off the owning thread.
    pub fn item_new_semaphore<S, F>(
        &mut self,
        priority: Priority,
        semaphore: Arc<S>,
        mut on_signal: F,
    ) -> RtPollResult<ItemId>
    where
        S: PollableSemaphore + 'static,
        F: FnMut(&mut ItemContext<'_>) -> StageResult + Send + 'static,
    {
        let id = self.item_new(priority, 1)?;
        if let Some(entry) = self.item_slot(id)?.first_mut() {
            *entry = PollFd::new(semaphore.descriptor(), POLLIN);
        }

        let before = Arc::clone(&semaphore);
        self.set_before_callback(id, move |_ctx: &mut ItemContext<'_>| {
            StageResult::from(before.before_poll())
        })?;

        let after = Arc::clone(&semaphore);
        self.set_after_callback(id, move |_ctx: &mut ItemContext<'_>| after.after_poll())?;

        self.set_work_callback(id, move |ctx: &mut ItemContext<'_>| {
            if semaphore.acknowledge() {
                on_signal(ctx)
            } else {
                StageResult::Idle
            }
        })?;

        tracing::debug!(item = %id, "Semaphore item registered");
        Ok(id)
    }

    /// Register an item that drains `queue`.
    ///
    /// The work stage pops until the queue is empty and passes every message
    /// to `dispatch`. The item reports `Pending` if any dispatch did.
    ///
    /// # Errors
    ///
    /// [`RtPollError::ThreadAffinityViolation`](crate::RtPollError::ThreadAffinityViolation)
    /// when called off the owning thread.
    pub fn item_new_queue<Q, F>(
        &mut self,
        priority: Priority,
        queue: Arc<Q>,
        mut dispatch: F,
    ) -> RtPollResult<ItemId>
    where
        Q: PollableQueue + 'static,
        F: FnMut(&mut ItemContext<'_>, Q::Message) -> StageResult + Send + 'static,
    {
        let id = self.item_new(priority, 1)?;
        if let Some(entry) = self.item_slot(id)?.first_mut() {
            *entry = PollFd::new(queue.descriptor(), POLLIN);
        }

        let before = Arc::clone(&queue);
        self.set_before_callback(id, move |_ctx: &mut ItemContext<'_>| {
            StageResult::from(before.before_poll())
        })?;

        let after = Arc::clone(&queue);
        self.set_after_callback(id, move |_ctx: &mut ItemContext<'_>| after.after_poll())?;

        self.set_work_callback(id, move |ctx: &mut ItemContext<'_>| {
            let mut pending = false;
            while let Some(message) = queue.try_pop() {
                pending |= dispatch(ctx, message).is_pending();
            }
            StageResult::from(pending)
        })?;

        tracing::debug!(item = %id, "Queue item registered");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counter without a real descriptor; `before_poll` keeps the loop awake.
    #[derive(Default)]
    struct CountingSem {
        pending: AtomicUsize,
        after_calls: AtomicUsize,
    }

    impl PollableSemaphore for CountingSem {
        fn descriptor(&self) -> RawFd {
            -1
        }

        fn acknowledge(&self) -> bool {
            self.pending
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
                .is_ok()
        }

        fn before_poll(&self) -> bool {
            self.pending.load(Ordering::Acquire) > 0
        }

        fn after_poll(&self) {
            self.after_calls.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[derive(Default)]
    struct VecQueue {
        messages: Mutex<VecDeque<u32>>,
    }

    impl PollableQueue for VecQueue {
        type Message = u32;

        fn descriptor(&self) -> RawFd {
            -1
        }

        fn try_pop(&self) -> Option<u32> {
            self.messages.lock().ok()?.pop_front()
        }

        fn before_poll(&self) -> bool {
            self.messages.lock().is_ok_and(|q| !q.is_empty())
        }
    }

    #[test]
    fn test_semaphore_item_consumes_one_signal_per_iteration()
    -> Result<(), Box<dyn std::error::Error>> {
        let mut rtpoll = RtPoll::new();
        let sem = Arc::new(CountingSem::default());
        sem.pending.store(2, Ordering::Release);

        let fired = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&fired);
        let id = rtpoll.item_new_semaphore(Priority::Normal, Arc::clone(&sem), move |_ctx| {
            seen.fetch_add(1, Ordering::Relaxed);
            StageResult::Idle
        })?;
        assert_eq!(rtpoll.item_slot(id)?.len(), 1);

        rtpoll.run(true)?;
        rtpoll.run(true)?;
        rtpoll.run(false)?;

        assert_eq!(fired.load(Ordering::Relaxed), 2);
        assert_eq!(sem.after_calls.load(Ordering::Relaxed), 3);
        Ok(())
    }

    #[test]
    fn test_queue_item_drains_everything() -> Result<(), Box<dyn std::error::Error>> {
        let mut rtpoll = RtPoll::new();
        let queue = Arc::new(VecQueue::default());
        if let Ok(mut q) = queue.messages.lock() {
            q.extend([1, 2, 3]);
        }

        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        rtpoll.item_new_queue(Priority::Normal, Arc::clone(&queue), move |_ctx, msg| {
            if let Ok(mut v) = sink.lock() {
                v.push(msg);
            }
            StageResult::Idle
        })?;

        let outcome = rtpoll.run(true)?;
        assert!(outcome.should_wait());
        assert_eq!(*received.lock().map_err(|_poison| "poisoned")?, vec![1, 2, 3]);
        Ok(())
    }

    #[test]
    fn test_queue_item_propagates_pending() -> Result<(), Box<dyn std::error::Error>> {
        let mut rtpoll = RtPoll::new();
        let queue = Arc::new(VecQueue::default());
        if let Ok(mut q) = queue.messages.lock() {
            q.push_back(7);
        }

        rtpoll.item_new_queue(Priority::Late, queue, |_ctx, _msg| StageResult::Pending)?;

        let outcome = rtpoll.run(false)?;
        assert_eq!(
            outcome,
            crate::RunOutcome::Continue {
                skip_next_wait: true
            }
        );
        Ok(())
    }
}
