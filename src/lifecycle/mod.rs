//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Init logging/metrics → Build controller + host
//!
//! Commands (signals.rs, commands.rs):
//!     SIGTERM/SIGINT, SIGUSR1/2, SIGHUP or stdin words → ServiceCommand
//!
//! Service host (host.rs):
//!     ServiceCommand → worker handles → ServiceStatus updates
//!
//! Shutdown (shutdown.rs):
//!     Stop received → cancel worker → await completion (bounded) → Stopped
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then observability, then the worker
//! - Shutdown has timeout: the host gives up waiting after the deadline
//! - Command sources never touch the worker, they only feed the host

pub mod commands;
pub mod host;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use commands::{ServiceCommand, ServiceStatus};
pub use host::{HostReport, ServiceHost};
pub use shutdown::Shutdown;
pub use startup::StartupError;
