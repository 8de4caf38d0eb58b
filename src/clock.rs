//! Frame timing for the FPS readout.

use std::time::{Duration, Instant};

/// Measures the interval between consecutive render passes.
#[derive(Debug, Default)]
pub struct FrameClock {
    last_tick: Option<Instant>,
    last_interval: Option<Duration>,
}

impl FrameClock {
    /// A clock that has not ticked yet.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_tick: None,
            last_interval: None,
        }
    }

    /// Mark the start of a render pass.
    pub fn tick(&mut self) -> Option<Duration> {
        self.tick_at(Instant::now())
    }

    /// Mark the start of a render pass at `now`. Returns the interval since
    /// the previous tick.
    pub fn tick_at(&mut self, now: Instant) -> Option<Duration> {
        self.last_interval = self.last_tick.map(|last| now.saturating_duration_since(last));
        self.last_tick = Some(now);
        self.last_interval
    }

    /// Instantaneous frames per second, truncated. Zero until two ticks
    /// have happened.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn fps(&self) -> u32 {
        match self.last_interval {
            Some(interval) if !interval.is_zero() => (1.0 / interval.as_secs_f64()) as u32,
            _ => 0,
        }
    }
}
