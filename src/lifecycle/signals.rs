//! Command sources: OS signals and interactive stdin.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT, SIGHUP, SIGUSR1, SIGUSR2)
//! - Read control words from stdin in interactive mode
//! - Translate both into `ServiceCommand`s for the service host
//!
//! # Signal Mapping
//! ```text
//! SIGINT / SIGTERM → Stop
//! SIGUSR1          → Pause
//! SIGUSR2          → Continue
//! SIGHUP           → Interrogate
//! ```
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Stdin is read on a plain thread so a blocked read never holds up runtime shutdown
//! - EOF on stdin is a stop request
//! - A second SIGINT/SIGTERM while stopping makes the host stop waiting for the worker

use std::io::{self, BufRead};
use std::thread;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::lifecycle::commands::ServiceCommand;

/// Forward OS signals as service commands until `shutdown` fires or the host goes away.
pub fn spawn_signal_listener(
    commands: mpsc::UnboundedSender<ServiceCommand>,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = listen(commands, shutdown).await {
            tracing::error!(error = %e, "Failed to install signal handlers");
        }
    })
}

#[cfg(unix)]
async fn listen(
    commands: mpsc::UnboundedSender<ServiceCommand>,
    shutdown: CancellationToken,
) -> io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut hangup = signal(SignalKind::hangup())?;
    let mut user1 = signal(SignalKind::user_defined1())?;
    let mut user2 = signal(SignalKind::user_defined2())?;

    loop {
        let command = tokio::select! {
            _ = shutdown.cancelled() => return Ok(()),
            _ = interrupt.recv() => ServiceCommand::Stop,
            _ = terminate.recv() => ServiceCommand::Stop,
            _ = user1.recv() => ServiceCommand::Pause,
            _ = user2.recv() => ServiceCommand::Continue,
            _ = hangup.recv() => ServiceCommand::Interrogate,
        };
        tracing::debug!(command = %command, "Signal received");
        if commands.send(command).is_err() {
            return Ok(());
        }
    }
}

#[cfg(not(unix))]
async fn listen(
    commands: mpsc::UnboundedSender<ServiceCommand>,
    shutdown: CancellationToken,
) -> io::Result<()> {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return Ok(()),
            result = tokio::signal::ctrl_c() => result?,
        }
        tracing::debug!("Ctrl-C received");
        if commands.send(ServiceCommand::Stop).is_err() {
            return Ok(());
        }
    }
}

/// Read control words from stdin on a dedicated thread.
pub fn spawn_stdin_reader(commands: mpsc::UnboundedSender<ServiceCommand>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let stdin = io::stdin();
        forward_lines(stdin.lock(), &commands);
    })
}

/// Forward each non-empty line of `input` as a command; EOF sends `Stop`.
///
/// Lines that do not parse are logged and skipped.
pub fn forward_lines<R: BufRead>(input: R, commands: &mpsc::UnboundedSender<ServiceCommand>) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read stdin");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<ServiceCommand>() {
            Ok(command) => {
                if commands.send(command).is_err() {
                    return;
                }
            }
            Err(e) => tracing::warn!(error = %e, "Expected pause, continue, status or stop"),
        }
    }
    let _ = commands.send(ServiceCommand::Stop);
}
