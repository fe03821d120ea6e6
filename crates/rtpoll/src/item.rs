//! Items: registered participants of a poll loop.
//!
//! An item owns a fixed-width slot of the loop's descriptor buffer and up to
//! three stage callbacks. Callbacks never see the loop itself, only an
//! [`ItemContext`] scoped to their own item, so they cannot reshape the
//! registry while an iteration is walking it.

use crate::pollfd::PollFd;
use crate::priority::Priority;
use crate::rtpoll::QuitHandle;
use std::any::Any;
use std::fmt;
use std::ops::Range;

/// Handle to an item registered with an [`RtPoll`](crate::RtPoll).
///
/// Handles are plain values. A handle whose item was released, or that was
/// issued by another poll loop, is rejected with
/// [`RtPollError::InvalidItem`](crate::RtPollError::InvalidItem).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId {
    pub(crate) rtpoll: u64,
    pub(crate) priority: Priority,
    pub(crate) seq: u64,
}

impl ItemId {
    /// Priority the item was registered with.
    #[inline]
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Registration sequence number, the tie-breaker between equal priorities.
    #[inline]
    pub fn registration_order(&self) -> u64 {
        self.seq
    }

    /// Position of the item in the service order.
    #[inline]
    pub(crate) fn sort_key(&self) -> (Priority, u64) {
        (self.priority, self.seq)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}({})@rtpoll#{}", self.seq, self.priority, self.rtpoll)
    }
}

/// What a before or work callback asks of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StageResult {
    /// Nothing further is needed.
    #[default]
    Idle,
    /// Work is pending: from a before-callback this skips the blocking wait,
    /// from a work-callback it asks the caller to run again without waiting.
    Pending,
}

impl StageResult {
    /// `true` for [`StageResult::Pending`].
    #[inline]
    pub fn is_pending(self) -> bool {
        matches!(self, StageResult::Pending)
    }
}

impl From<bool> for StageResult {
    fn from(pending: bool) -> Self {
        if pending {
            StageResult::Pending
        } else {
            StageResult::Idle
        }
    }
}

/// Callback run before the blocking wait.
pub type BeforeFn = Box<dyn FnMut(&mut ItemContext<'_>) -> StageResult + Send>;
/// Callback run after the (possibly skipped) wait.
pub type AfterFn = Box<dyn FnMut(&mut ItemContext<'_>) + Send>;
/// Callback run in the work stage.
pub type WorkFn = Box<dyn FnMut(&mut ItemContext<'_>) -> StageResult + Send>;

pub(crate) type Userdata = Option<Box<dyn Any + Send>>;

/// View of one item handed to its callbacks.
pub struct ItemContext<'a> {
    id: ItemId,
    slot: &'a mut [PollFd],
    userdata: &'a mut Userdata,
    quit: &'a QuitHandle,
    timer_elapsed: bool,
}

impl<'a> ItemContext<'a> {
    pub(crate) fn new(
        id: ItemId,
        slot: &'a mut [PollFd],
        userdata: &'a mut Userdata,
        quit: &'a QuitHandle,
        timer_elapsed: bool,
    ) -> Self {
        Self {
            id,
            slot,
            userdata,
            quit,
            timer_elapsed,
        }
    }

    /// Handle of the item being serviced.
    #[inline]
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Priority of the item being serviced.
    #[inline]
    pub fn priority(&self) -> Priority {
        self.id.priority
    }

    /// The item's descriptors, with `revents` from the last wait.
    #[inline]
    pub fn slot(&self) -> &[PollFd] {
        self.slot
    }

    /// Mutable access to the item's descriptors.
    #[inline]
    pub fn slot_mut(&mut self) -> &mut [PollFd] {
        &mut *self.slot
    }

    /// The item's userdata, if set and of type `T`.
    pub fn userdata<T: Any>(&mut self) -> Option<&mut T> {
        self.userdata.as_mut()?.downcast_mut::<T>()
    }

    /// Ask the loop to stop; honoured once the current iteration finishes.
    #[inline]
    pub fn request_quit(&self) {
        self.quit.request_quit();
    }

    /// Whether quit has been requested.
    #[inline]
    pub fn is_quit_requested(&self) -> bool {
        self.quit.is_quit_requested()
    }

    /// Whether the wait of the current iteration was ended by the timer.
    #[inline]
    pub fn timer_elapsed(&self) -> bool {
        self.timer_elapsed
    }
}

impl fmt::Debug for ItemContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemContext")
            .field("id", &self.id)
            .field("slot", &self.slot)
            .field("timer_elapsed", &self.timer_elapsed)
            .finish_non_exhaustive()
    }
}

/// Registry entry for one item.
pub(crate) struct Item {
    pub(crate) id: ItemId,
    pub(crate) n_fds: usize,
    /// Position of the slot in the descriptor buffer, `None` until the
    /// first rebuild after registration.
    pub(crate) range: Option<Range<usize>>,
    pub(crate) before: Option<BeforeFn>,
    pub(crate) after: Option<AfterFn>,
    pub(crate) work: Option<WorkFn>,
    pub(crate) userdata: Userdata,
}

impl Item {
    pub(crate) fn new(id: ItemId, n_fds: usize) -> Self {
        Self {
            id,
            n_fds,
            range: None,
            before: None,
            after: None,
            work: None,
            userdata: None,
        }
    }

    /// Sort key: priority first, then registration order.
    #[inline]
    pub(crate) fn sort_key(&self) -> (Priority, u64) {
        self.id.sort_key()
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("id", &self.id)
            .field("n_fds", &self.n_fds)
            .field("range", &self.range)
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .field("work", &self.work.is_some())
            .field("userdata", &self.userdata.is_some())
            .finish()
    }
}
