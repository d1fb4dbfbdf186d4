//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (periods > 0, fast not slower than slow)
//! - Check addresses that are only parsed later at startup
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServiceConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("service.name must not be empty")]
    EmptyServiceName,

    #[error("service.shutdown_timeout_secs must be greater than zero")]
    ZeroShutdownTimeout,

    #[error("ticker.{0} must be greater than zero")]
    ZeroPeriod(&'static str),

    #[error("ticker.fast_ms ({fast_ms}) must not exceed ticker.slow_ms ({slow_ms})")]
    FastSlowerThanSlow { fast_ms: u64, slow_ms: u64 },

    #[error("observability.log_level must not be empty")]
    EmptyLogLevel,

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.service.name.trim().is_empty() {
        errors.push(ValidationError::EmptyServiceName);
    }
    if config.service.shutdown_timeout_secs == 0 {
        errors.push(ValidationError::ZeroShutdownTimeout);
    }

    let ticker = &config.ticker;
    if ticker.fast_ms == 0 {
        errors.push(ValidationError::ZeroPeriod("fast_ms"));
    }
    if ticker.slow_ms == 0 {
        errors.push(ValidationError::ZeroPeriod("slow_ms"));
    }
    if ticker.fast_ms > ticker.slow_ms {
        errors.push(ValidationError::FastSlowerThanSlow {
            fast_ms: ticker.fast_ms,
            slow_ms: ticker.slow_ms,
        });
    }

    let observability = &config.observability;
    if observability.log_level.trim().is_empty() {
        errors.push(ValidationError::EmptyLogLevel);
    }
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
