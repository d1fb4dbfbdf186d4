//! Periodic worker subsystem.
//!
//! # Data Flow
//! ```text
//! Supervisor:
//!     start(token) → (PauseHandle, ContinueHandle)
//!
//! Run loop (controller.rs, own task):
//!     wait for first of { cancellation, control signal, tick }
//!     → tick: beep (action.rs) + Info "beep" record
//!     → pause / continue: ticker.rs switches slow / fast
//!     → cancel: publish Stopped, drop receiver (handles close)
//! ```
//!
//! # State Machine
//! ```text
//! Idle --start--> Running(Fast)
//! Running(Fast) --pause--> Running(Slow)
//! Running(Slow) --continue--> Running(Fast)
//! Running(_) --cancel--> Stopped   (terminal)
//! ```

pub mod action;
pub mod controller;
pub mod ticker;
pub mod types;

pub use action::{Beeper, BeeperKind, SilentBeeper, TerminalBell};
pub use controller::{ContinueHandle, LifecycleController, PauseHandle};
pub use ticker::RateTicker;
pub use types::{ControlSignal, TickInterval, TickRates, WorkerError, WorkerReport, WorkerState};
