//! Two-rate ticker.
//!
//! # Responsibilities
//! - Deliver one tick per elapsed period at the selected interval
//! - Switch between fast and slow cadence on request
//!
//! # Design Decisions
//! - A rate change re-arms the wait: the next tick arrives one full new
//!   period after the switch, never earlier
//! - `tick` is cancel-safe: dropping it mid-wait keeps the armed deadline,
//!   so losing a `select!` race does not stretch the cadence
//! - Deadlines chain from the previous tick to avoid drift; a loop that
//!   falls a whole period behind restarts from now instead of bursting

use std::time::Duration;
use tokio::time::{self, Instant};

use crate::worker::types::{TickInterval, TickRates};

pub struct RateTicker {
    rates: TickRates,
    active: TickInterval,
    deadline: Option<Instant>,
}

impl RateTicker {
    pub fn new(rates: TickRates, initial: TickInterval) -> Self {
        Self {
            rates,
            active: initial,
            deadline: None,
        }
    }

    /// The currently selected interval.
    pub fn active(&self) -> TickInterval {
        self.active
    }

    /// Length of the current period.
    pub fn period(&self) -> Duration {
        self.rates.period(self.active)
    }

    /// Switch cadence. Returns `false` if `interval` was already active,
    /// in which case the in-flight wait is left untouched.
    pub fn select(&mut self, interval: TickInterval) -> bool {
        if self.active == interval {
            return false;
        }
        self.active = interval;
        self.deadline = None;
        true
    }

    /// Wait for the next tick and return the instant it was scheduled for.
    pub async fn tick(&mut self) -> Instant {
        let deadline = self.arm();
        time::sleep_until(deadline).await;

        let now = Instant::now();
        let next = deadline + self.period();
        self.deadline = Some(if next > now { next } else { now + self.period() });
        deadline
    }

    fn arm(&mut self) -> Instant {
        match self.deadline {
            Some(deadline) => deadline,
            None => {
                let deadline = Instant::now() + self.period();
                self.deadline = Some(deadline);
                deadline
            }
        }
    }
}
