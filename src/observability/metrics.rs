//! Metrics collection and exposition.
//!
//! # Metrics
//! - `beep_ticks_total` (counter): ticks processed, by interval
//! - `beep_action_failures_total` (counter): failed periodic actions
//! - `beep_sink_failures_total` (counter): rejected log sink writes
//! - `beep_control_signals_total` (counter): control signals handled, by signal
//! - `beep_worker_interval_ms` (gauge): active tick period
//!
//! Recording is a no-op until a recorder is installed, so the worker can
//! always record and the exporter stays optional.

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::worker::{ControlSignal, TickInterval};

/// Install the Prometheus recorder and serve it on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_tick(interval: TickInterval) {
    ::metrics::counter!("beep_ticks_total", "interval" => interval.as_str()).increment(1);
}

pub fn record_action_failure() {
    ::metrics::counter!("beep_action_failures_total").increment(1);
}

pub fn record_sink_failure() {
    ::metrics::counter!("beep_sink_failures_total").increment(1);
}

pub fn record_control_signal(signal: ControlSignal) {
    ::metrics::counter!("beep_control_signals_total", "signal" => signal.as_str()).increment(1);
}

pub fn record_interval(period: Duration) {
    ::metrics::gauge!("beep_worker_interval_ms").set(period.as_millis() as f64);
}
