//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize the logging subscriber and the worker's sink
//! - Start the metrics exporter when enabled
//! - Build the controller and service host from configuration
//!
//! # Design Decisions
//! - Fail fast: a logging or metrics failure prevents the worker from starting
//! - Subsystems initialize in order, not concurrently
//! - The worker starts last, inside the service host

use std::net::{AddrParseError, SocketAddr};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::ServiceConfig;
use crate::lifecycle::commands::ServiceStatus;
use crate::lifecycle::host::ServiceHost;
use crate::observability::logging::{init_logging, LogSink, TracingSink};
use crate::observability::metrics;
use crate::worker::LifecycleController;

/// Errors that keep the service from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to initialise logging: {0}")]
    Logging(String),

    #[error("invalid metrics address '{address}': {source}")]
    MetricsAddress {
        address: String,
        source: AddrParseError,
    },

    #[error("failed to start metrics exporter: {0}")]
    Metrics(String),
}

/// Install process-wide observability and return the sink the worker will write to.
///
/// Must be called from within a Tokio runtime when metrics are enabled.
/// The log format follows `config.service.mode` unless set explicitly.
pub fn init_observability(config: &ServiceConfig) -> Result<Arc<dyn LogSink>, StartupError> {
    let observability = &config.observability;
    init_logging(
        observability.effective_format(config.service.mode),
        &observability.log_level,
    )
    .map_err(StartupError::Logging)?;

    if observability.metrics_enabled {
        let addr: SocketAddr =
            observability
                .metrics_address
                .parse()
                .map_err(|source| StartupError::MetricsAddress {
                    address: observability.metrics_address.clone(),
                    source,
                })?;
        metrics::init_metrics(addr).map_err(|e| StartupError::Metrics(e.to_string()))?;
    }

    Ok(Arc::new(TracingSink::new(observability.sink_level)))
}

/// Wire a controller and service host for `config`.
pub fn build_host(
    config: &ServiceConfig,
    sink: Arc<dyn LogSink>,
) -> (ServiceHost, mpsc::UnboundedReceiver<ServiceStatus>) {
    let controller = LifecycleController::new(
        config.ticker.rates(),
        sink.clone(),
        config.worker.beeper.build(),
    );
    ServiceHost::new(&config.service, controller, sink)
}
