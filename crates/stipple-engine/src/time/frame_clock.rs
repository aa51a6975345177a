use std::time::{Duration, Instant};

/// Period `elapsed` is measured in.
pub const ELAPSED_PERIOD: Duration = Duration::from_millis(5000);

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Milliseconds since the previous tick (or since start, for the first).
    pub delta: f64,

    /// Time since start in units of [`ELAPSED_PERIOD`].
    ///
    /// Grows without bound; callers wrap it when they want a cycle.
    pub elapsed: f64,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Frame clock producing `FrameTime` snapshots.
///
/// `FrameClock` is meant to be used per window (or per loop) so that
/// multi-window applications do not share timing state. Deltas are reported
/// as measured, without clamping.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    frame_index: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self {
            start,
            last: start,
            frame_index: 0,
        }
    }

    /// Resets the baseline for both `delta` and `elapsed`.
    pub fn reset(&mut self) {
        self.reset_at(Instant::now());
    }

    pub fn reset_at(&mut self, now: Instant) {
        *self = Self::starting_at(now);
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advances the clock to `now`.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let delta = now.saturating_duration_since(self.last);
        let since_start = now.saturating_duration_since(self.start);
        self.last = now;

        let ft = FrameTime {
            delta: delta.as_nanos() as f64 / 1e6,
            elapsed: since_start.as_nanos() as f64 / ELAPSED_PERIOD.as_nanos() as f64,
            now,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
