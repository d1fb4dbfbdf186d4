//! Worker state, control signals and error definitions.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::observability::logging::SinkError;

/// The two cadences the worker can run at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickInterval {
    Fast,
    Slow,
}

impl TickInterval {
    pub fn as_str(self) -> &'static str {
        match self {
            TickInterval::Fast => "fast",
            TickInterval::Slow => "slow",
        }
    }
}

impl fmt::Display for TickInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durations backing each [`TickInterval`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickRates {
    pub fast: Duration,
    pub slow: Duration,
}

impl TickRates {
    pub fn new(fast: Duration, slow: Duration) -> Self {
        Self { fast, slow }
    }

    /// Duration of one period at the given interval.
    pub fn period(&self, interval: TickInterval) -> Duration {
        match interval {
            TickInterval::Fast => self.fast,
            TickInterval::Slow => self.slow,
        }
    }
}

impl Default for TickRates {
    fn default() -> Self {
        Self {
            fast: Duration::from_millis(500),
            slow: Duration::from_millis(2000),
        }
    }
}

/// A request from the supervisor to the run loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlSignal {
    Pause,
    Continue,
    Cancel,
}

impl ControlSignal {
    pub fn as_str(self) -> &'static str {
        match self {
            ControlSignal::Pause => "pause",
            ControlSignal::Continue => "continue",
            ControlSignal::Cancel => "cancel",
        }
    }
}

impl fmt::Display for ControlSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a worker.
///
/// `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerState {
    Idle,
    Running(TickInterval),
    Stopped,
}

impl WorkerState {
    pub fn is_running(self) -> bool {
        matches!(self, WorkerState::Running(_))
    }

    pub fn is_terminal(self) -> bool {
        self == WorkerState::Stopped
    }

    /// The active interval, if the worker is running.
    pub fn interval(self) -> Option<TickInterval> {
        match self {
            WorkerState::Running(interval) => Some(interval),
            _ => None,
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerState::Idle => f.write_str("idle"),
            WorkerState::Running(interval) => write!(f, "running ({})", interval),
            WorkerState::Stopped => f.write_str("stopped"),
        }
    }
}

/// Errors raised by the worker's lifecycle operations.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// `start` was called on a controller that already started.
    #[error("worker already started")]
    AlreadyStarted,

    /// A control signal was sent to a worker that can no longer accept it.
    #[error("cannot {signal} a worker that is {state}")]
    InvalidTransition {
        signal: ControlSignal,
        state: WorkerState,
    },

    /// The logging sink rejected a write.
    #[error("log sink write failed: {0}")]
    SinkWriteFailure(#[from] SinkError),

    /// `join` was called before `start`, or twice.
    #[error("worker not started or already joined")]
    NotStarted,

    /// The run loop task panicked or was aborted.
    #[error("worker task failed: {0}")]
    TaskFailed(String),
}

/// Summary produced once the run loop has exited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    /// Number of ticks processed.
    pub ticks: u64,
    /// Number of periodic actions that failed.
    pub action_failures: u64,
    /// Number of writes the log sink rejected.
    pub sink_failures: u64,
    /// State at exit. Always `Stopped` for a loop that exited normally.
    pub final_state: WorkerState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rates() {
        let rates = TickRates::default();
        assert_eq!(rates.period(TickInterval::Fast), Duration::from_millis(500));
        assert_eq!(rates.period(TickInterval::Slow), Duration::from_millis(2000));
    }

    #[test]
    fn test_state_queries() {
        assert!(!WorkerState::Idle.is_running());
        assert!(WorkerState::Running(TickInterval::Slow).is_running());
        assert!(WorkerState::Stopped.is_terminal());
        assert_eq!(
            WorkerState::Running(TickInterval::Fast).interval(),
            Some(TickInterval::Fast)
        );
        assert_eq!(WorkerState::Stopped.interval(), None);
    }

    #[test]
    fn test_error_display() {
        let err = WorkerError::InvalidTransition {
            signal: ControlSignal::Pause,
            state: WorkerState::Stopped,
        };
        assert_eq!(err.to_string(), "cannot pause a worker that is stopped");
        assert_eq!(WorkerError::AlreadyStarted.to_string(), "worker already started");
    }
}
