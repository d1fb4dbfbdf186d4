//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::observability::logging::{Level, LogFormat};
use crate::worker::{BeeperKind, TickRates};

/// Root configuration for the beep service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Service identity and supervisor behaviour.
    pub service: ServiceSection,

    /// Tick cadence.
    pub ticker: TickerConfig,

    /// Periodic action settings.
    pub worker: WorkerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// How the process is being driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Started by a service manager; controlled through OS signals.
    #[default]
    Service,
    /// Started from a terminal; controlled through stdin and Ctrl-C.
    Interactive,
}

impl RunMode {
    pub fn is_interactive(self) -> bool {
        self == RunMode::Interactive
    }
}

/// Service identity and supervisor settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceSection {
    /// Service name used in logs.
    pub name: String,

    /// Run mode. The CLI subcommand overrides this.
    pub mode: RunMode,

    /// How long a stop request may wait for the worker to exit, in seconds.
    pub shutdown_timeout_secs: u64,
}

impl ServiceSection {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self {
            name: "beep-service".to_string(),
            mode: RunMode::Service,
            shutdown_timeout_secs: 30,
        }
    }
}

/// Tick cadence configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TickerConfig {
    /// Fast period in milliseconds.
    pub fast_ms: u64,

    /// Slow (paused) period in milliseconds.
    pub slow_ms: u64,
}

impl TickerConfig {
    pub fn rates(&self) -> TickRates {
        TickRates::new(
            Duration::from_millis(self.fast_ms),
            Duration::from_millis(self.slow_ms),
        )
    }
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            fast_ms: 500,
            slow_ms: 2000,
        }
    }
}

/// Periodic action configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// `bell` rings the terminal bell, `silent` only logs.
    pub beeper: BeeperKind,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Subscriber filter (trace, debug, info, warn, error or a full directive).
    pub log_level: String,

    /// Output format; `auto` follows the run mode.
    pub log_format: LogFormat,

    /// Minimum level the worker's sink forwards.
    pub sink_level: Level,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl ObservabilityConfig {
    /// Resolve `auto` against the run mode.
    pub fn effective_format(&self, mode: RunMode) -> LogFormat {
        match (self.log_format, mode) {
            (LogFormat::Auto, RunMode::Service) => LogFormat::Json,
            (LogFormat::Auto, RunMode::Interactive) => LogFormat::Pretty,
            (format, _) => format,
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Auto,
            sink_level: Level::Debug,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.service.shutdown_timeout(), Duration::from_secs(30));
        assert_eq!(config.service.mode, RunMode::Service);
        assert_eq!(config.ticker.rates(), TickRates::default());
        assert_eq!(config.worker.beeper, BeeperKind::Bell);
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ServiceConfig = toml::from_str(
            r#"
            [ticker]
            slow_ms = 5000

            [worker]
            beeper = "silent"

            [observability]
            sink_level = "warn"
            "#,
        )
        .unwrap();

        assert_eq!(config.ticker.fast_ms, 500);
        assert_eq!(config.ticker.slow_ms, 5000);
        assert_eq!(config.worker.beeper, BeeperKind::Silent);
        assert_eq!(config.observability.sink_level, Level::Warn);
        assert_eq!(config.service.name, "beep-service");
    }

    #[test]
    fn test_auto_format_follows_mode() {
        let observability = ObservabilityConfig::default();
        assert_eq!(observability.effective_format(RunMode::Service), LogFormat::Json);
        assert_eq!(
            observability.effective_format(RunMode::Interactive),
            LogFormat::Pretty
        );

        let forced = ObservabilityConfig {
            log_format: LogFormat::Json,
            ..ObservabilityConfig::default()
        };
        assert_eq!(forced.effective_format(RunMode::Interactive), LogFormat::Json);
    }

    #[test]
    fn test_service_mode_from_file_selects_format() {
        let config: ServiceConfig = toml::from_str(
            r#"
            [service]
            name = "desk-beeper"
            mode = "interactive"
            "#,
        )
        .unwrap();

        assert!(config.service.mode.is_interactive());
        assert_eq!(
            config.observability.effective_format(config.service.mode),
            LogFormat::Pretty
        );
    }
}
