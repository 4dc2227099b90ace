//! How long a wait call may block.

use embassy_time::{Duration, Instant};

/// Bound on a waiting call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    /// Check the queue exactly once and return without idling.
    Immediate,
    /// Give up once this much time has passed since the call started.
    After(Duration),
    /// Wait until a matching event arrives.
    Never,
}

impl Timeout {
    /// Shorthand for `Timeout::After(Duration::from_millis(ms))`, with `0`
    /// mapping to [`Timeout::Immediate`].
    pub const fn from_millis(ms: u64) -> Self {
        if ms == 0 {
            Timeout::Immediate
        } else {
            Timeout::After(Duration::from_millis(ms))
        }
    }

    /// The point in time after which a wait started at `start` has expired.
    pub(crate) fn deadline(self, start: Instant) -> Option<Instant> {
        match self {
            Timeout::Immediate => Some(start),
            Timeout::After(duration) => Some(start + duration),
            Timeout::Never => None,
        }
    }
}

impl From<Duration> for Timeout {
    fn from(duration: Duration) -> Self {
        if duration.as_ticks() == 0 {
            Timeout::Immediate
        } else {
            Timeout::After(duration)
        }
    }
}

impl From<Option<Duration>> for Timeout {
    fn from(duration: Option<Duration>) -> Self {
        duration.map_or(Timeout::Never, Timeout::from)
    }
}
