//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Worker run loop:
//!     → LogSink (leveled records, "beep" on every tick)
//!     → metrics.rs (tick / failure / signal counters)
//!
//! Service host and binary:
//!     → tracing macros directly (structured fields)
//!
//! Consumers:
//!     → stdout (JSON in service mode, pretty in interactive mode)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - The worker depends on the `LogSink` capability, never on a concrete logger
//! - Sink failures are counted and swallowed
//! - Metrics are cheap (atomic increments) and a no-op without an exporter

pub mod logging;
pub mod metrics;

pub use logging::{Level, LogSink, MemorySink, SinkError, TracingSink};
