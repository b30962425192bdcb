//! Race clock ownership
//!
//! The session owns exactly one clock. Starting it always retires the
//! previous handle first, so at most one tick stream is ever live. The
//! driver turns the live handle into a timer and drops any timer whose
//! handle is no longer current.

use std::time::Duration;

/// Identity of one armed period of the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClockHandle {
    generation: u64,
}

impl ClockHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone)]
pub struct RaceClock {
    period: Duration,
    live: Option<ClockHandle>,
    generations: u64,
}

impl RaceClock {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            live: None,
            generations: 0,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Arm the clock, cancelling any handle still live
    pub fn start(&mut self) -> ClockHandle {
        if let Some(old) = self.live.take() {
            tracing::debug!(generation = old.generation, "Cancelling live clock before restart");
        }
        self.generations += 1;
        let handle = ClockHandle {
            generation: self.generations,
        };
        self.live = Some(handle);
        handle
    }

    /// Disarm the clock. Returns whether a handle was live; stopping an
    /// idle clock is a no-op.
    pub fn stop(&mut self) -> bool {
        self.live.take().is_some()
    }

    pub fn handle(&self) -> Option<ClockHandle> {
        self.live
    }

    pub fn is_running(&self) -> bool {
        self.live.is_some()
    }

    /// Whether `handle` is the one currently armed
    pub fn is_current(&self, handle: ClockHandle) -> bool {
        self.live == Some(handle)
    }
}
