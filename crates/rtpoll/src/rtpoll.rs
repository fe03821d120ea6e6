//! The poll loop.
//!
//! One [`RtPoll`] drives one real-time thread. Each call to [`RtPoll::run`]
//! performs a full staged iteration:
//!
//! 1. stop early if quit was requested
//! 2. rebuild the descriptor buffer if items were added or released
//! 3. run every before-callback; any `Pending` result skips the wait
//! 4. arm the timer and block in `poll(2)` (unless skipped)
//! 5. run every after-callback
//! 6. run every work-callback; any `Pending` result is returned as a hint
//! 7. report `Quit` or `Continue`
//!
//! Every stage walks the items in `(priority, registration order)`.
//! Items at [`Priority::Never`] only contribute descriptors.

use crate::clock::Timestamp;
use crate::config::RtPollConfig;
use crate::error::{RtPollError, RtPollResult};
use crate::item::{Item, ItemContext, ItemId, StageResult};
use crate::pollfd::{self, PollFd};
use crate::priority::Priority;
use crate::stats::WakeupStats;
use crate::timer::{TimerMode, TimerSlot};
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};
use std::time::Duration;

#[cfg(target_os = "linux")]
use crate::linux::{PlatformTimer, apply_thread_setup};

#[cfg(not(target_os = "linux"))]
use crate::fallback::{PlatformTimer, apply_thread_setup};

static NEXT_RTPOLL_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    /// The poll loop installed on this thread, if any.
    static INSTALLED: RefCell<Option<InstallToken>> = const { RefCell::new(None) };
}

struct InstallToken {
    rtpoll: u64,
    alive: Weak<()>,
}

/// Cloneable, thread-safe quit flag of a poll loop.
///
/// `request_quit` is a single atomic store and is safe to call from any
/// thread, including from a signal handler.
#[derive(Debug, Clone, Default)]
pub struct QuitHandle {
    flag: Arc<AtomicBool>,
}

impl QuitHandle {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to stop. Idempotent.
    #[inline]
    pub fn request_quit(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether quit has been requested.
    #[inline]
    pub fn is_quit_requested(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Verdict of one [`RtPoll::run`] iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Quit was requested; stop calling `run`.
    Quit,
    /// Call `run` again.
    Continue {
        /// A work-callback reported pending work: the next call should pass
        /// `wait = false` to drain it without sleeping.
        skip_next_wait: bool,
    },
}

impl RunOutcome {
    /// `true` for [`RunOutcome::Quit`].
    #[inline]
    pub fn is_quit(&self) -> bool {
        matches!(self, RunOutcome::Quit)
    }

    /// The `wait` argument the next `run` call should use.
    #[inline]
    pub fn should_wait(&self) -> bool {
        matches!(
            self,
            RunOutcome::Continue {
                skip_next_wait: false
            }
        )
    }
}

#[derive(Debug, Clone, Copy)]
enum Stage {
    Before,
    After,
    Work,
}

/// Real-time poll loop.
///
/// `RtPoll` is `Send` so it can be built on one thread and handed to the
/// real-time thread, which then [`install`](RtPoll::install)s it. From then
/// on every operation must come from that thread; only the
/// [`QuitHandle`] may be used elsewhere.
pub struct RtPoll {
    id: u64,
    config: RtPollConfig,

    /// Live items, sorted by `(priority, registration order)`.
    items: Vec<Item>,
    next_seq: u64,

    /// Descriptor buffer: every item's slot, concatenated in service order.
    pollfd: Vec<PollFd>,
    /// Previous buffer, kept to rebuild into without reallocating.
    pollfd_spare: Vec<PollFd>,
    rebuild_needed: bool,

    timer: TimerSlot,
    platform: Option<PlatformTimer>,
    timer_elapsed: bool,

    owner: Option<ThreadId>,
    alive: Arc<()>,
    quit: QuitHandle,

    iterations: u64,
    stats: WakeupStats,
}

impl RtPoll {
    /// Create a poll loop with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RtPollConfig::default())
    }

    /// Create a poll loop with a custom configuration.
    ///
    /// Allocates the descriptor buffers up front; call during initialization.
    pub fn with_config(config: RtPollConfig) -> Self {
        let capacity = config.descriptor_capacity.saturating_add(1);
        Self {
            id: NEXT_RTPOLL_ID.fetch_add(1, Ordering::Relaxed),
            items: Vec::new(),
            next_seq: 0,
            pollfd: Vec::with_capacity(capacity),
            pollfd_spare: Vec::with_capacity(capacity),
            rebuild_needed: false,
            timer: TimerSlot::new(),
            platform: None,
            timer_elapsed: false,
            owner: None,
            alive: Arc::new(()),
            quit: QuitHandle::new(),
            iterations: 0,
            stats: WakeupStats::with_capacity(config.wakeup_sample_capacity),
            config,
        }
    }

    /// Bind the loop to the calling thread.
    ///
    /// Creates the interval timer and applies the configured thread setup.
    /// Installing again on the same thread is a no-op.
    ///
    /// # Errors
    ///
    /// - [`RtPollError::ThreadAffinityViolation`] if the loop is already bound
    ///   to another thread, or another live loop is installed on this one.
    /// - [`RtPollError::TimerArm`] if the timer cannot be created.
    pub fn install(&mut self) -> RtPollResult {
        let current = thread::current().id();
        if let Some(owner) = self.owner {
            return if owner == current {
                Ok(())
            } else {
                Err(RtPollError::ThreadAffinityViolation)
            };
        }

        let platform = INSTALLED.with(|installed| -> RtPollResult<PlatformTimer> {
            let mut installed = installed.borrow_mut();
            let occupied = installed
                .as_ref()
                .is_some_and(|token| token.rtpoll != self.id && token.alive.strong_count() > 0);
            if occupied {
                return Err(RtPollError::ThreadAffinityViolation);
            }

            let platform = PlatformTimer::new()?;
            apply_thread_setup(&self.config);
            *installed = Some(InstallToken {
                rtpoll: self.id,
                alive: Arc::downgrade(&self.alive),
            });
            Ok(platform)
        })?;

        self.platform = Some(platform);
        self.owner = Some(current);

        tracing::debug!(
            rtpoll = self.id,
            thread = ?current,
            backend = PlatformTimer::BACKEND,
            "rtpoll installed"
        );
        Ok(())
    }

    /// Whether the loop is bound to a thread.
    #[inline]
    pub fn is_installed(&self) -> bool {
        self.owner.is_some()
    }

    /// Run one iteration.
    ///
    /// With `wait = false` the blocking wait is skipped, but every callback
    /// stage still runs. A loop that was never installed is installed on the
    /// calling thread first.
    ///
    /// # Errors
    ///
    /// - [`RtPollError::PollSyscall`] if `poll(2)` fails with anything but `EINTR`.
    /// - [`RtPollError::TimerArm`] if the timer cannot be armed.
    /// - [`RtPollError::ThreadAffinityViolation`] when called off the owning thread.
    pub fn run(&mut self, wait: bool) -> RtPollResult<RunOutcome> {
        self.check_affinity()?;

        if self.quit.is_quit_requested() {
            return Ok(RunOutcome::Quit);
        }

        if !self.is_installed() {
            self.install()?;
        }

        if self.rebuild_needed {
            self.rebuild();
        }
        self.timer_elapsed = false;

        let skip_wait = self.dispatch(Stage::Before);

        let nothing_to_wait_for = self.pollfd.is_empty() && !self.timer.is_enabled();
        if wait && !skip_wait && !nothing_to_wait_for {
            self.wait()?;
        } else {
            self.pollfd.iter_mut().for_each(PollFd::clear_revents);
        }

        self.dispatch(Stage::After);
        let work_pending = self.dispatch(Stage::Work);

        self.iterations = self.iterations.wrapping_add(1);

        if self.quit.is_quit_requested() {
            return Ok(RunOutcome::Quit);
        }
        Ok(RunOutcome::Continue {
            skip_next_wait: work_pending,
        })
    }

    /// Run iterations until quit is requested, honouring the skip-wait hint.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by [`RtPoll::run`].
    pub fn run_until_quit(&mut self) -> RtPollResult {
        let mut wait = true;
        loop {
            match self.run(wait)? {
                RunOutcome::Quit => return Ok(()),
                outcome @ RunOutcome::Continue { .. } => wait = outcome.should_wait(),
            }
        }
    }

    /// Handle that can request quit from any thread.
    pub fn quit_handle(&self) -> QuitHandle {
        self.quit.clone()
    }

    /// Ask the loop to stop; the next `run` returns [`RunOutcome::Quit`].
    #[inline]
    pub fn request_quit(&self) {
        self.quit.request_quit();
    }

    /// Whether quit has been requested.
    #[inline]
    pub fn is_quit_requested(&self) -> bool {
        self.quit.is_quit_requested()
    }

    /// Arm the timer for one expiration at `deadline`.
    ///
    /// Takes effect from the next `run` call.
    ///
    /// # Errors
    ///
    /// [`RtPollError::ThreadAffinityViolation`] when called off the owning thread.
    pub fn set_timer_absolute(&mut self, deadline: Timestamp) -> RtPollResult {
        self.check_affinity()?;
        self.timer.set_absolute(deadline);
        tracing::debug!(rtpoll = self.id, ?deadline, "Timer set to absolute deadline");
        Ok(())
    }

    /// Fire every `period`, starting one period from now.
    ///
    /// # Errors
    ///
    /// [`RtPollError::ThreadAffinityViolation`] when called off the owning thread.
    pub fn set_timer_periodic(&mut self, period: Duration) -> RtPollResult {
        self.check_affinity()?;
        self.timer.set_periodic(period, Timestamp::now());
        tracing::debug!(rtpoll = self.id, ?period, "Timer set to periodic");
        Ok(())
    }

    /// Fire once, `delay` from now.
    ///
    /// # Errors
    ///
    /// [`RtPollError::ThreadAffinityViolation`] when called off the owning thread.
    pub fn set_timer_relative(&mut self, delay: Duration) -> RtPollResult {
        self.check_affinity()?;
        self.timer.set_relative(delay, Timestamp::now());
        tracing::debug!(rtpoll = self.id, ?delay, "Timer set to relative delay");
        Ok(())
    }

    /// Cancel any pending expiration.
    ///
    /// # Errors
    ///
    /// [`RtPollError::ThreadAffinityViolation`] when called off the owning thread.
    pub fn set_timer_disabled(&mut self) -> RtPollResult {
        self.check_affinity()?;
        self.timer.set_disabled();
        tracing::debug!(rtpoll = self.id, "Timer disabled");
        Ok(())
    }

    /// Current timer configuration.
    #[inline]
    pub fn timer_mode(&self) -> TimerMode {
        self.timer.mode()
    }

    /// Deadline the next blocking wait will be armed with.
    #[inline]
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.timer.next_deadline()
    }

    /// Whether the wait of the last iteration was ended by the timer.
    #[inline]
    pub fn timer_elapsed(&self) -> bool {
        self.timer_elapsed
    }

    /// Register a new item with a zeroed slot of `n_fds` descriptors.
    ///
    /// Unused entries have `fd == -1` and are ignored by the wait until the
    /// owner fills them in through [`RtPoll::item_slot`].
    ///
    /// # Errors
    ///
    /// [`RtPollError::ThreadAffinityViolation`] when called off the owning thread.
    pub fn item_new(&mut self, priority: Priority, n_fds: usize) -> RtPollResult<ItemId> {
        self.check_affinity()?;

        let id = ItemId {
            rtpoll: self.id,
            priority,
            seq: self.next_seq,
        };
        self.next_seq = self.next_seq.wrapping_add(1);

        let at = self
            .items
            .partition_point(|item| item.sort_key() <= id.sort_key());
        self.items.insert(at, Item::new(id, n_fds));
        self.rebuild_needed = true;

        Ok(id)
    }

    /// Detach an item. Its slot is reclaimed on the next rebuild.
    ///
    /// # Errors
    ///
    /// [`RtPollError::InvalidItem`] if the item was already released.
    pub fn item_release(&mut self, id: ItemId) -> RtPollResult {
        self.check_affinity()?;
        let at = self.position(id)?;
        self.items.remove(at);
        self.rebuild_needed = true;
        Ok(())
    }

    /// The item's slot of the descriptor buffer.
    ///
    /// The returned borrow ends before the next `run`, item creation or
    /// release, matching the lifetime of the underlying buffer layout.
    ///
    /// # Errors
    ///
    /// [`RtPollError::InvalidItem`] if the item was released.
    pub fn item_slot(&mut self, id: ItemId) -> RtPollResult<&mut [PollFd]> {
        self.check_affinity()?;
        let at = self.position(id)?;
        if self.rebuild_needed {
            self.rebuild();
        }

        let range = self
            .items
            .get(at)
            .and_then(|item| item.range.clone())
            .ok_or(RtPollError::InvalidItem)?;
        self.pollfd.get_mut(range).ok_or(RtPollError::InvalidItem)
    }

    /// Priority of a live item.
    ///
    /// # Errors
    ///
    /// [`RtPollError::InvalidItem`] if the item was released.
    pub fn item_priority(&self, id: ItemId) -> RtPollResult<Priority> {
        self.check_affinity()?;
        self.position(id).map(|_| id.priority)
    }

    /// Install the before-callback.
    ///
    /// # Errors
    ///
    /// [`RtPollError::InvalidItem`] if the item was released.
    pub fn set_before_callback<F>(&mut self, id: ItemId, callback: F) -> RtPollResult
    where
        F: FnMut(&mut ItemContext<'_>) -> StageResult + Send + 'static,
    {
        self.item_mut(id)?.before = Some(Box::new(callback));
        self.note_never(id);
        Ok(())
    }

    /// Install the after-callback.
    ///
    /// # Errors
    ///
    /// [`RtPollError::InvalidItem`] if the item was released.
    pub fn set_after_callback<F>(&mut self, id: ItemId, callback: F) -> RtPollResult
    where
        F: FnMut(&mut ItemContext<'_>) + Send + 'static,
    {
        self.item_mut(id)?.after = Some(Box::new(callback));
        self.note_never(id);
        Ok(())
    }

    /// Install the work-callback.
    ///
    /// # Errors
    ///
    /// [`RtPollError::InvalidItem`] if the item was released.
    pub fn set_work_callback<F>(&mut self, id: ItemId, callback: F) -> RtPollResult
    where
        F: FnMut(&mut ItemContext<'_>) -> StageResult + Send + 'static,
    {
        self.item_mut(id)?.work = Some(Box::new(callback));
        self.note_never(id);
        Ok(())
    }

    /// Remove the before-callback.
    ///
    /// # Errors
    ///
    /// [`RtPollError::InvalidItem`] if the item was released.
    pub fn clear_before_callback(&mut self, id: ItemId) -> RtPollResult {
        self.item_mut(id)?.before = None;
        Ok(())
    }

    /// Remove the after-callback.
    ///
    /// # Errors
    ///
    /// [`RtPollError::InvalidItem`] if the item was released.
    pub fn clear_after_callback(&mut self, id: ItemId) -> RtPollResult {
        self.item_mut(id)?.after = None;
        Ok(())
    }

    /// Remove the work-callback.
    ///
    /// # Errors
    ///
    /// [`RtPollError::InvalidItem`] if the item was released.
    pub fn clear_work_callback(&mut self, id: ItemId) -> RtPollResult {
        self.item_mut(id)?.work = None;
        Ok(())
    }

    /// Attach opaque data to the item, replacing any previous value.
    ///
    /// # Errors
    ///
    /// [`RtPollError::InvalidItem`] if the item was released.
    pub fn set_userdata<T: Any + Send>(&mut self, id: ItemId, data: T) -> RtPollResult {
        self.item_mut(id)?.userdata = Some(Box::new(data));
        Ok(())
    }

    /// The item's data, if set and of type `T`.
    ///
    /// # Errors
    ///
    /// [`RtPollError::InvalidItem`] if the item was released.
    pub fn userdata<T: Any>(&self, id: ItemId) -> RtPollResult<Option<&T>> {
        self.check_affinity()?;
        let at = self.position(id)?;
        Ok(self
            .items
            .get(at)
            .and_then(|item| item.userdata.as_ref())
            .and_then(|data| data.downcast_ref::<T>()))
    }

    /// Mutable access to the item's data, if set and of type `T`.
    ///
    /// # Errors
    ///
    /// [`RtPollError::InvalidItem`] if the item was released.
    pub fn userdata_mut<T: Any>(&mut self, id: ItemId) -> RtPollResult<Option<&mut T>> {
        Ok(self
            .item_mut(id)?
            .userdata
            .as_mut()
            .and_then(|data| data.downcast_mut::<T>()))
    }

    /// Detach and return the item's data if it is of type `T`.
    ///
    /// Data of another type is left in place.
    ///
    /// # Errors
    ///
    /// [`RtPollError::InvalidItem`] if the item was released.
    pub fn take_userdata<T: Any>(&mut self, id: ItemId) -> RtPollResult<Option<T>> {
        let item = self.item_mut(id)?;
        let Some(data) = item.userdata.take() else {
            return Ok(None);
        };
        match data.downcast::<T>() {
            Ok(value) => Ok(Some(*value)),
            Err(other) => {
                item.userdata = Some(other);
                Ok(None)
            }
        }
    }

    /// Number of live items.
    #[inline]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Total slot width of the live items.
    pub fn descriptor_count(&self) -> usize {
        self.items.iter().map(|item| item.n_fds).sum()
    }

    /// The whole descriptor buffer, rebuilt first if the item set changed.
    pub fn descriptors(&mut self) -> &[PollFd] {
        if self.rebuild_needed {
            self.rebuild();
        }
        &self.pollfd
    }

    /// Items in service order.
    pub fn items(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.items.iter().map(|item| item.id)
    }

    /// Completed iterations.
    #[inline]
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Timer wake-up lateness statistics.
    #[inline]
    pub fn wakeup_stats(&self) -> &WakeupStats {
        &self.stats
    }

    /// Mutable statistics, for percentile queries.
    #[inline]
    pub fn wakeup_stats_mut(&mut self) -> &mut WakeupStats {
        &mut self.stats
    }

    /// Configuration the loop was built with.
    #[inline]
    pub fn config(&self) -> &RtPollConfig {
        &self.config
    }

    fn check_affinity(&self) -> RtPollResult {
        match self.owner {
            Some(owner) if owner != thread::current().id() => {
                Err(RtPollError::ThreadAffinityViolation)
            }
            _ => Ok(()),
        }
    }

    fn position(&self, id: ItemId) -> RtPollResult<usize> {
        if id.rtpoll != self.id {
            return Err(RtPollError::InvalidItem);
        }
        self.items
            .binary_search_by_key(&id.sort_key(), Item::sort_key)
            .map_err(|_missing| RtPollError::InvalidItem)
    }

    fn item_mut(&mut self, id: ItemId) -> RtPollResult<&mut Item> {
        self.check_affinity()?;
        let at = self.position(id)?;
        self.items.get_mut(at).ok_or(RtPollError::InvalidItem)
    }

    fn note_never(&self, id: ItemId) {
        if !id.priority.runs_callbacks() {
            tracing::debug!(item = %id, "Callback on a never-priority item will not be invoked");
        }
    }

    /// Lay out every item's slot contiguously in service order.
    ///
    /// Existing slots keep their contents; new slots start empty. The old
    /// buffer becomes the spare for the next rebuild.
    fn rebuild(&mut self) {
        let total = self.descriptor_count();

        let mut next = std::mem::take(&mut self.pollfd_spare);
        next.clear();
        // One extra entry for the timer descriptor appended during the wait.
        next.reserve(total.saturating_add(1));

        for item in &mut self.items {
            let start = next.len();
            match item.range.clone().and_then(|old| self.pollfd.get(old)) {
                Some(old) => next.extend_from_slice(old),
                None => next.resize(start.saturating_add(item.n_fds), PollFd::EMPTY),
            }
            item.range = Some(start..next.len());
        }

        self.pollfd_spare = std::mem::replace(&mut self.pollfd, next);
        self.rebuild_needed = false;

        tracing::trace!(
            rtpoll = self.id,
            items = self.items.len(),
            descriptors = total,
            "Descriptor buffer rebuilt"
        );
    }

    /// Run one callback stage over all items in service order.
    ///
    /// Returns whether any callback reported [`StageResult::Pending`].
    fn dispatch(&mut self, stage: Stage) -> bool {
        let Self {
            items,
            pollfd,
            quit,
            timer_elapsed,
            ..
        } = self;

        let mut pending = false;
        for item in items.iter_mut() {
            // Never-priority items sort last.
            if !item.id.priority.runs_callbacks() {
                break;
            }

            let Item {
                id,
                range,
                before,
                after,
                work,
                userdata,
                ..
            } = item;

            let result = match stage {
                Stage::Before => before.as_mut().map(|callback| {
                    let slot = slot_of(pollfd, range);
                    callback(&mut ItemContext::new(*id, slot, userdata, quit, *timer_elapsed))
                }),
                Stage::After => after.as_mut().map(|callback| {
                    let slot = slot_of(pollfd, range);
                    callback(&mut ItemContext::new(*id, slot, userdata, quit, *timer_elapsed));
                    StageResult::Idle
                }),
                Stage::Work => work.as_mut().map(|callback| {
                    let slot = slot_of(pollfd, range);
                    callback(&mut ItemContext::new(*id, slot, userdata, quit, *timer_elapsed))
                }),
            };

            pending |= result.is_some_and(StageResult::is_pending);
        }
        pending
    }

    /// Block until a descriptor is ready or the timer expires.
    fn wait(&mut self) -> RtPollResult {
        let deadline = self.timer.next_deadline();
        let platform = self
            .platform
            .as_mut()
            .ok_or(RtPollError::ThreadAffinityViolation)?;

        match deadline {
            Some(deadline) => platform.arm(deadline)?,
            None => platform.disarm()?,
        }

        let timer_entry = platform.pollfd();
        if let Some(entry) = timer_entry {
            self.pollfd.push(entry);
        }

        let result = loop {
            match pollfd::poll(&mut self.pollfd, platform.timeout_ms(deadline)) {
                Err(libc::EINTR) => continue,
                other => break other,
            }
        };

        let timer_entry = match timer_entry {
            Some(_) => self.pollfd.pop(),
            None => None,
        };

        if let Err(errno) = result {
            tracing::error!(rtpoll = self.id, errno, "poll() failed");
            return Err(RtPollError::PollSyscall { errno });
        }

        if platform.expired(timer_entry.as_ref()) {
            self.timer_elapsed = true;
            if let Some(fired) = self.timer.fire() {
                let lateness = Timestamp::now().saturating_duration_since(fired);
                self.stats
                    .record(u64::try_from(lateness.as_nanos()).unwrap_or(u64::MAX));
            }
        }

        Ok(())
    }
}

fn slot_of<'a>(pollfd: &'a mut [PollFd], range: &Option<Range<usize>>) -> &'a mut [PollFd] {
    range
        .clone()
        .and_then(|range| pollfd.get_mut(range))
        .unwrap_or_default()
}

impl Default for RtPoll {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RtPoll {
    fn drop(&mut self) {
        if self.owner != Some(thread::current().id()) {
            return;
        }
        let cleared = INSTALLED.try_with(|installed| {
            let mut installed = installed.borrow_mut();
            if installed
                .as_ref()
                .is_some_and(|token| token.rtpoll == self.id)
            {
                *installed = None;
            }
        });
        // Thread-local storage is already gone at thread exit.
        if let Err(err) = cleared {
            tracing::trace!(rtpoll = self.id, %err, "Install token already destroyed");
        }
    }
}

impl fmt::Debug for RtPoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RtPoll")
            .field("id", &self.id)
            .field("items", &self.items)
            .field("descriptors", &self.pollfd.len())
            .field("rebuild_needed", &self.rebuild_needed)
            .field("timer", &self.timer.mode())
            .field("owner", &self.owner)
            .field("quit", &self.quit.is_quit_requested())
            .field("iterations", &self.iterations)
            .finish_non_exhaustive()
    }
}
