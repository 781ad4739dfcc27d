//! Debounced sweep scheduling.
//!
//! Mutations arrive in bursts, so every request pushes the sweep
//! deadline out by the debounce delay and only the trailing edge runs.
//! At most one sweep is in flight at a time; requests landing mid-sweep
//! coalesce into a single follow-up pass.
//!
//! The scheduler never looks at the clock itself. Callers pass the
//! current [`Instant`] into every operation, which keeps the engine free
//! of threads and timers and makes scheduling behavior testable with
//! plain arithmetic.

use std::time::{Duration, Instant};

/// Trailing-edge delay applied to mutation bursts before a sweep runs.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(150);

/// Debounce and single-flight state for document sweeps.
#[derive(Debug, Clone)]
pub struct SweepScheduler {
    delay: Duration,
    deadline: Option<Instant>,
    in_flight: bool,
    run_again: bool,
}

impl SweepScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
            in_flight: false,
            run_again: false,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Asks for a sweep. Resets the pending deadline to `now + delay`,
    /// so a stream of requests keeps pushing the sweep out until the
    /// stream pauses. A request during an active sweep marks the sweep
    /// for an immediate re-run instead.
    pub fn request(&mut self, now: Instant) {
        if self.in_flight {
            self.run_again = true;
            return;
        }
        self.deadline = Some(now + self.delay);
    }

    /// The instant the pending sweep becomes due, if one is scheduled.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// True when nothing is scheduled, running, or queued to re-run.
    pub fn is_idle(&self) -> bool {
        self.deadline.is_none() && !self.in_flight && !self.run_again
    }

    /// Claims the pending sweep if its deadline has passed. Returns
    /// whether the caller should sweep now; on `true` the scheduler is
    /// in flight until [`finish_sweep`](Self::finish_sweep).
    pub fn begin_sweep(&mut self, now: Instant) -> bool {
        if self.in_flight {
            return false;
        }
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.in_flight = true;
                true
            }
            _ => false,
        }
    }

    /// Marks the active sweep complete. If requests arrived mid-sweep,
    /// one follow-up sweep becomes due immediately.
    pub fn finish_sweep(&mut self, now: Instant) {
        self.in_flight = false;
        if self.run_again {
            self.run_again = false;
            self.deadline = Some(now);
        }
    }

    /// Drops any pending or queued work without touching an active sweep.
    pub fn cancel(&mut self) {
        self.deadline = None;
        self.run_again = false;
    }
}

impl Default for SweepScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}
