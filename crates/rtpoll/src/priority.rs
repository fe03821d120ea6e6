//! Item priorities.

use std::fmt;

/// Priority of an rtpoll item.
///
/// Items are serviced in ascending numeric order, ties broken by
/// registration order. The set of levels is fixed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i32)]
pub enum Priority {
    /// Control messages and anything that must be seen first.
    Early = -100,
    /// Regular work.
    #[default]
    Normal = 0,
    /// Housekeeping.
    Late = 100,
    /// Contributes descriptors only; no callback stage ever runs.
    Never = i32::MAX,
}

impl Priority {
    /// Numeric value of the level.
    #[inline]
    pub const fn value(self) -> i32 {
        self as i32
    }

    /// Whether items at this level take part in callback stages.
    #[inline]
    pub const fn runs_callbacks(self) -> bool {
        !matches!(self, Priority::Never)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Early => write!(f, "early"),
            Priority::Normal => write!(f, "normal"),
            Priority::Late => write!(f, "late"),
            Priority::Never => write!(f, "never"),
        }
    }
}
