//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → CLI overrides (run mode, log level)
//!     → handed by value to startup, worker and service host
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Run mode is configuration, never process-global state
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::ObservabilityConfig;
pub use schema::RunMode;
pub use schema::ServiceConfig;
pub use schema::ServiceSection;
pub use schema::TickerConfig;
pub use schema::WorkerConfig;
