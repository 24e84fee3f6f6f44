//! Monotonic timing primitives used to capture TTC and TTFB samples.

use std::time::Instant;

/// A single start/stop timing measurement.
///
/// Mirrors the original C implementation's `timing_t` (`util.h`): a span is
/// opened with [`TimingSpan::start`] and closed with [`TimingSpan::stop`],
/// which returns the elapsed delta in nanoseconds. Unlike the original,
/// which timed with `CLOCK_REALTIME`, this uses [`Instant`] so the delta is
/// guaranteed monotonic.
#[derive(Copy, Clone, Debug)]
pub struct TimingSpan {
    start: Instant,
}

impl TimingSpan {
    /// Opens a new span, marking `start` as now.
    #[inline]
    pub fn start() -> Self {
        Self { start: Instant::now() }
    }

    /// Closes the span and returns the elapsed delta in nanoseconds.
    ///
    /// May be called more than once; each call measures from the original
    /// `start` to the instant of the call.
    #[inline]
    pub fn stop(&self) -> i64 {
        Instant::now().duration_since(self.start).as_nanos() as i64
    }
}

/// Sentinel stored in a [`TimingResult`] field that was never observed.
pub const NOT_OBSERVED: i64 = -1;

/// Per-connection latency sample pair.
///
/// `ttc` (time-to-connect) and `ttfb` (time-to-first-byte) are nanosecond
/// deltas from `connect()` initiation, or [`NOT_OBSERVED`] if the
/// corresponding event never happened.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimingResult {
    pub ttc: i64,
    pub ttfb: i64,
}

impl Default for TimingResult {
    fn default() -> Self {
        Self { ttc: NOT_OBSERVED, ttfb: NOT_OBSERVED }
    }
}
