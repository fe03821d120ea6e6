//! Timer wake-up statistics.
//!
//! Every observed timer expiration records how late the loop woke up
//! relative to the armed deadline.

use std::vec::Vec;

/// Lateness statistics for timer wake-ups.
///
/// # RT-Safety
///
/// - `record` is O(1) and writes into a bounded ring buffer
/// - Percentile queries reuse scratch storage
/// - No allocations after construction
#[derive(Debug, Clone)]
pub struct WakeupStats {
    /// Number of timer expirations observed
    pub wakeups: u64,

    /// Maximum observed lateness in nanoseconds
    pub max_lateness_ns: u64,

    /// Lateness of the most recent wake-up in nanoseconds
    pub last_lateness_ns: u64,

    /// Sum of lateness for the mean
    lateness_sum_ns: u128,

    /// Recent samples for percentile calculation (ring buffer)
    recent: Vec<u64>,

    /// Maximum samples retained
    max_samples: usize,

    /// Ring buffer write index
    next_index: usize,

    /// Reused scratch storage for percentile selection
    scratch: Vec<u64>,
}

impl Default for WakeupStats {
    fn default() -> Self {
        Self::with_capacity(crate::config::DEFAULT_WAKEUP_SAMPLES)
    }
}

impl WakeupStats {
    /// Create stats with default capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create stats retaining at most `max_samples` samples.
    pub fn with_capacity(max_samples: usize) -> Self {
        Self {
            wakeups: 0,
            max_lateness_ns: 0,
            last_lateness_ns: 0,
            lateness_sum_ns: 0,
            recent: Vec::with_capacity(max_samples),
            max_samples,
            next_index: 0,
            scratch: Vec::with_capacity(max_samples),
        }
    }

    /// Record one wake-up `lateness_ns` after its deadline.
    pub fn record(&mut self, lateness_ns: u64) {
        self.wakeups = self.wakeups.saturating_add(1);
        self.max_lateness_ns = self.max_lateness_ns.max(lateness_ns);
        self.last_lateness_ns = lateness_ns;
        self.lateness_sum_ns = self.lateness_sum_ns.saturating_add(u128::from(lateness_ns));

        if self.max_samples == 0 {
            return;
        }

        if self.recent.len() < self.max_samples {
            self.recent.push(lateness_ns);
        } else if let Some(slot) = self.recent.get_mut(self.next_index) {
            *slot = lateness_ns;
            self.next_index = (self.next_index + 1) % self.max_samples;
        }
    }

    /// Median lateness in nanoseconds.
    pub fn p50_lateness_ns(&mut self) -> u64 {
        self.percentile_lateness_ns(500)
    }

    /// 95th percentile lateness in nanoseconds.
    pub fn p95_lateness_ns(&mut self) -> u64 {
        self.percentile_lateness_ns(950)
    }

    /// 99th percentile lateness in nanoseconds.
    pub fn p99_lateness_ns(&mut self) -> u64 {
        self.percentile_lateness_ns(990)
    }

    /// Lateness at `per_mille` (0 to 1000) over the retained samples, 0 if empty.
    pub fn percentile_lateness_ns(&mut self, per_mille: u16) -> u64 {
        let len = self.recent.len();
        if len == 0 {
            return 0;
        }

        self.scratch.clear();
        self.scratch.extend_from_slice(&self.recent);

        let rank = len.saturating_mul(usize::from(per_mille.min(1000))) / 1000;
        let (_, value, _) = self.scratch.select_nth_unstable(rank.min(len - 1));
        *value
    }

    /// Mean lateness over all recorded wake-ups.
    pub fn mean_lateness_ns(&self) -> f64 {
        if self.wakeups == 0 {
            return 0.0;
        }
        self.lateness_sum_ns as f64 / self.wakeups as f64
    }

    /// Whether p99 lateness stays within `max_p99_ns`.
    pub fn meets_budget(&mut self, max_p99_ns: u64) -> bool {
        self.p99_lateness_ns() <= max_p99_ns
    }

    /// Number of samples currently retained.
    pub fn sample_count(&self) -> usize {
        self.recent.len()
    }

    /// Reset all statistics.
    pub fn reset(&mut self) {
        self.wakeups = 0;
        self.max_lateness_ns = 0;
        self.last_lateness_ns = 0;
        self.lateness_sum_ns = 0;
        self.recent.clear();
        self.next_index = 0;
        self.scratch.clear();
    }
}
