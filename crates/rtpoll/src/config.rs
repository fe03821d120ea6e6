//! Poll loop configuration.

/// Configuration of an [`RtPoll`](crate::RtPoll).
///
/// The thread setup fields are applied to the calling thread by
/// [`RtPoll::install`](crate::RtPoll::install). Failing to apply them is not
/// fatal: an audio thread still runs, just without real-time guarantees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtPollConfig {
    /// SCHED_FIFO priority for the installing thread (None = leave as is).
    ///
    /// Only honoured on Linux, and only with CAP_SYS_NICE or a suitable
    /// RLIMIT_RTPRIO.
    pub realtime_priority: Option<i32>,

    /// Lock all current and future memory pages to avoid page faults
    /// inside the loop.
    pub lock_memory: bool,

    /// CPU affinity mask for the installing thread (None = no affinity).
    ///
    /// Each bit represents a CPU core (bit 0 = core 0, etc.).
    pub cpu_affinity: Option<u64>,

    /// Initial capacity of the descriptor buffer, so that typical item sets
    /// never reallocate it.
    pub descriptor_capacity: usize,

    /// Number of timer wake-up samples kept for percentile statistics.
    pub wakeup_sample_capacity: usize,
}

/// Default descriptor buffer capacity.
pub const DEFAULT_DESCRIPTOR_CAPACITY: usize = 32;

/// Default number of retained wake-up samples.
pub const DEFAULT_WAKEUP_SAMPLES: usize = 1_024;

impl Default for RtPollConfig {
    fn default() -> Self {
        Self {
            realtime_priority: None,
            lock_memory: false,
            cpu_affinity: None,
            descriptor_capacity: DEFAULT_DESCRIPTOR_CAPACITY,
            wakeup_sample_capacity: DEFAULT_WAKEUP_SAMPLES,
        }
    }
}

impl RtPollConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Config for a real-time audio thread at the given SCHED_FIFO priority.
    pub fn realtime(priority: i32) -> Self {
        Self {
            realtime_priority: Some(priority),
            lock_memory: true,
            ..Self::default()
        }
    }

    /// Config for tests: no thread setup, small buffers.
    pub fn testing() -> Self {
        Self {
            descriptor_capacity: 8,
            wakeup_sample_capacity: 256,
            ..Self::default()
        }
    }

    /// Set the SCHED_FIFO priority.
    pub fn with_realtime_priority(mut self, priority: i32) -> Self {
        self.realtime_priority = Some(priority);
        self
    }

    /// Set memory locking.
    pub fn with_lock_memory(mut self, enabled: bool) -> Self {
        self.lock_memory = enabled;
        self
    }

    /// Set CPU affinity mask.
    pub fn with_cpu_affinity(mut self, mask: u64) -> Self {
        self.cpu_affinity = Some(mask);
        self
    }

    /// Set the initial descriptor buffer capacity.
    pub fn with_descriptor_capacity(mut self, capacity: usize) -> Self {
        self.descriptor_capacity = capacity;
        self
    }

    /// Set the number of retained wake-up samples.
    pub fn with_wakeup_sample_capacity(mut self, capacity: usize) -> Self {
        self.wakeup_sample_capacity = capacity;
        self
    }

    /// Check if any thread setup is requested.
    pub fn has_rt_features(&self) -> bool {
        self.realtime_priority.is_some() || self.lock_memory || self.cpu_affinity.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = RtPollConfig::default();
        assert!(config.realtime_priority.is_none());
        assert!(!config.lock_memory);
        assert!(config.cpu_affinity.is_none());
        assert_eq!(config.descriptor_capacity, DEFAULT_DESCRIPTOR_CAPACITY);
        assert!(!config.has_rt_features());
    }

    #[test]
    fn test_realtime() {
        let config = RtPollConfig::realtime(70);
        assert_eq!(config.realtime_priority, Some(70));
        assert!(config.lock_memory);
        assert!(config.has_rt_features());
    }

    #[test]
    fn test_builder_pattern() {
        let config = RtPollConfig::testing()
            .with_lock_memory(true)
            .with_cpu_affinity(0x0F)
            .with_descriptor_capacity(64)
            .with_wakeup_sample_capacity(16);

        assert!(config.lock_memory);
        assert_eq!(config.cpu_affinity, Some(0x0F));
        assert_eq!(config.descriptor_capacity, 64);
        assert_eq!(config.wakeup_sample_capacity, 16);
    }

    #[test]
    fn test_has_rt_features() {
        assert!(!RtPollConfig::testing().has_rt_features());
        assert!(RtPollConfig::testing().with_cpu_affinity(1).has_rt_features());
        assert!(
            RtPollConfig::testing()
                .with_realtime_priority(10)
                .has_rt_features()
        );
    }
}
