//! Beep service
//!
//! Hosts one periodic worker that beeps every 500 ms, slows down to every
//! 2 s when paused and stops cleanly on request.
//!
//! # Architecture Overview
//!
//! ```text
//!   SIGTERM/SIGINT ─┐                ┌──────────────────────────────────────┐
//!   SIGUSR1/SIGUSR2 ├─▶ signals.rs ─▶│             ServiceHost              │
//!   SIGHUP          ┘       │        │  StartPending → Running ⇄ Paused     │──▶ status log
//!   stdin (debug) ──────────┘        │       → StopPending → Stopped        │
//!                                    └──────┬──────────────┬────────────────┘
//!                                   pause / continue    cancel token
//!                                           ▼              ▼
//!                                    ┌──────────────────────────────────────┐
//!                                    │     LifecycleController run loop     │
//!                                    │  RateTicker (fast / slow) → beep     │──▶ LogSink / metrics
//!                                    └──────────────────────────────────────┘
//! ```
//!
//! # Commands
//! - `run`: service mode, JSON logs, controlled by signals
//! - `debug`: interactive mode, readable logs, controlled by stdin and Ctrl-C
//! - `check-config`: print the effective configuration and exit

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;

use beep_service::config::{load_or_default, RunMode};
use beep_service::lifecycle::{signals, startup, Shutdown};

#[derive(Parser)]
#[command(name = "beep-service")]
#[command(about = "Periodic beep worker with pause/continue/stop control", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `observability.log_level`.
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run as a managed service (signal control)
    Run,
    /// Run interactively (stdin control)
    Debug,
    /// Validate and print the effective configuration
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_or_default(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }

    let mode = match cli.command {
        Commands::Run => RunMode::Service,
        Commands::Debug => RunMode::Interactive,
        Commands::CheckConfig => {
            print!("{}", toml::to_string_pretty(&config)?);
            return Ok(());
        }
    };
    config.service.mode = mode;

    let sink = startup::init_observability(&config)?;

    tracing::info!(
        service = %config.service.name,
        mode = ?mode,
        args = ?std::env::args().collect::<Vec<_>>(),
        fast_ms = config.ticker.fast_ms,
        slow_ms = config.ticker.slow_ms,
        shutdown_timeout_secs = config.service.shutdown_timeout_secs,
        "Configuration loaded"
    );

    let (host, mut statuses) = startup::build_host(&config, sink);
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let shutdown = Shutdown::new();

    let listener = signals::spawn_signal_listener(command_tx.clone(), shutdown.token());
    if mode.is_interactive() {
        eprintln!("Type pause, continue, status or stop (Ctrl-C also stops).");
        signals::spawn_stdin_reader(command_tx.clone());
    }
    drop(command_tx);

    let status_log = tokio::spawn(async move {
        while let Some(status) = statuses.recv().await {
            tracing::info!(status = %status, "Service status changed");
        }
    });

    let report = host.run(command_rx, shutdown.token()).await;
    shutdown.trigger();
    let _ = listener.await;
    let _ = status_log.await;

    if report.timed_out {
        return Err(format!(
            "worker did not stop within {}s",
            config.service.shutdown_timeout_secs
        )
        .into());
    }

    if report.forced {
        return Err("shutdown forced before the worker stopped".into());
    }

    if let Some(worker) = report.worker {
        tracing::info!(
            ticks = worker.ticks,
            action_failures = worker.action_failures,
            sink_failures = worker.sink_failures,
            "Shutdown complete"
        );
    }
    Ok(())
}
