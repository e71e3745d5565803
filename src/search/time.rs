//! Search time budgeting and cooperative-cancellation polling cadence.

use std::time::{Duration, Instant};

/// Polling cadence once there's no time pressure (a node-count power of two).
const RELAXED_CHECK_INTERVAL: u64 = 4096;
/// Tighter cadence once the deadline is imminent.
const TIGHT_CHECK_INTERVAL: u64 = 1024;
/// Below this much remaining budget, poll at the tight cadence.
const TIGHT_THRESHOLD: Duration = Duration::from_millis(50);

/// Owns the search's deadline (if any) and answers "keep going?" questions
/// for both the node-count-gated cancellation check and the
/// iterative-deepening loop.
pub struct TimeManager {
    start: Instant,
    cutoff: Option<Instant>,
    last_iteration_start: Instant,
}

impl TimeManager {
    #[must_use]
    pub fn new(budget: Option<Duration>) -> Self {
        let start = Instant::now();
        TimeManager { start, cutoff: budget.map(|d| start + d), last_iteration_start: start }
    }

    #[must_use]
    pub fn unbounded() -> Self {
        Self::new(None)
    }

    /// `movetime` wins outright; otherwise the side to move's clock is
    /// divided by 200 plus its increment (no time control fields present
    /// means search indefinitely).
    #[must_use]
    pub fn budget_from_go(
        movetime: Option<Duration>,
        my_time: Option<Duration>,
        my_increment: Option<Duration>,
    ) -> Option<Duration> {
        if let Some(mt) = movetime {
            return Some(mt);
        }
        my_time.map(|t| t / 200 + my_increment.unwrap_or_default())
    }

    #[must_use]
    pub fn has_timed_out(&self) -> bool {
        self.cutoff.is_some_and(|c| Instant::now() >= c)
    }

    #[must_use]
    pub fn time_spent(&self) -> Duration {
        self.start.elapsed()
    }

    /// A power-of-two node-count interval at which cancellation should be
    /// polled, shrinking as the deadline approaches.
    #[must_use]
    pub fn check_interval(&self) -> u64 {
        match self.cutoff {
            None => RELAXED_CHECK_INTERVAL,
            Some(cutoff) => {
                if cutoff.saturating_duration_since(Instant::now()) < TIGHT_THRESHOLD {
                    TIGHT_CHECK_INTERVAL
                } else {
                    RELAXED_CHECK_INTERVAL
                }
            }
        }
    }

    pub fn start_iteration(&mut self) {
        self.last_iteration_start = Instant::now();
    }

    /// Whether the next iterative-deepening iteration is likely to fit in
    /// the remaining budget, assuming it takes roughly 4x as long as the
    /// last one (the typical branching-factor-driven growth rate).
    #[must_use]
    pub fn can_continue_iteration(&self) -> bool {
        let Some(cutoff) = self.cutoff else { return true };
        let now = Instant::now();
        if now >= cutoff {
            return false;
        }
        let last = now.saturating_duration_since(self.last_iteration_start);
        let remaining = cutoff.saturating_duration_since(now);
        last.saturating_mul(4) < remaining
    }
}
