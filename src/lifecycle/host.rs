//! In-process service host.
//!
//! # Responsibilities
//! - Start the worker and report StartPending → Running
//! - Translate service commands into worker control signals
//! - Echo status on interrogate, log unknown control codes
//! - Bound worker shutdown with a timeout and report Stopped
//! - Stop waiting for the worker on a repeated stop request
//!
//! # Design Decisions
//! - The host never touches worker state; it only holds handles
//! - Rejected or unknown commands are logged, never fatal
//! - A closed command channel or cancelled root token counts as a stop request
//! - The worker only stops on the host's token; pause/continue are rejected
//!   afterwards only if the worker task died

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::config::ServiceSection;
use crate::lifecycle::commands::{ServiceCommand, ServiceStatus};
use crate::observability::logging::{Level, LogSink};
use crate::worker::{LifecycleController, WorkerReport};

/// Outcome of a host run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostReport {
    /// Worker summary, absent if the worker failed to start or to stop in time.
    pub worker: Option<WorkerReport>,
    /// True if the worker did not exit within the shutdown timeout.
    pub timed_out: bool,
    /// True if a repeated stop request cut the wait short.
    pub forced: bool,
}

/// Supervises a single worker on behalf of an external controller.
pub struct ServiceHost {
    name: String,
    shutdown_timeout: Duration,
    controller: LifecycleController,
    sink: Arc<dyn LogSink>,
    status_tx: mpsc::UnboundedSender<ServiceStatus>,
}

impl ServiceHost {
    /// Create a host for `controller`.
    ///
    /// Returns the host and a receiver for every status it reports.
    pub fn new(
        service: &ServiceSection,
        controller: LifecycleController,
        sink: Arc<dyn LogSink>,
    ) -> (Self, mpsc::UnboundedReceiver<ServiceStatus>) {
        let (status_tx, status_rx) = mpsc::unbounded_channel();
        (
            Self {
                name: service.name.clone(),
                shutdown_timeout: service.shutdown_timeout(),
                controller,
                sink,
                status_tx,
            },
            status_rx,
        )
    }

    /// Override the shutdown timeout.
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Run until a stop or shutdown command, a closed command channel, or `shutdown`.
    pub async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<ServiceCommand>,
        shutdown: CancellationToken,
    ) -> HostReport {
        tracing::info!(service = %self.name, "Starting service");
        self.report(ServiceStatus::StartPending);

        let token = shutdown.child_token();
        let (pause, resume) = match self.controller.start(token.clone()) {
            Ok(handles) => handles,
            Err(e) => {
                self.log(Level::Error, &format!("{} failed to start: {}", self.name, e));
                self.report(ServiceStatus::Stopped);
                return HostReport {
                    worker: None,
                    timed_out: false,
                    forced: false,
                };
            }
        };

        let mut current = ServiceStatus::Running;
        self.report(current);

        loop {
            let command = tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    tracing::info!(service = %self.name, "Shutdown requested");
                    break;
                }
                command = commands.recv() => match command {
                    Some(command) => command,
                    None => {
                        tracing::info!(service = %self.name, "Command channel closed, stopping");
                        break;
                    }
                },
            };

            tracing::debug!(service = %self.name, command = %command, "Control request received");
            match command {
                ServiceCommand::Interrogate => self.report(current),
                ServiceCommand::Stop | ServiceCommand::Shutdown => break,
                ServiceCommand::Start => {
                    if let Err(e) = self.controller.start(token.clone()) {
                        self.log(Level::Warn, &format!("ignoring start request: {}", e));
                    }
                }
                ServiceCommand::Pause => match pause.send() {
                    Ok(()) => {
                        current = ServiceStatus::Paused;
                        self.report(current);
                    }
                    Err(e) => self.log(Level::Warn, &format!("ignoring pause request: {}", e)),
                },
                ServiceCommand::Continue => match resume.send() {
                    Ok(()) => {
                        current = ServiceStatus::Running;
                        self.report(current);
                    }
                    Err(e) => self.log(Level::Warn, &format!("ignoring continue request: {}", e)),
                },
                ServiceCommand::Unknown(code) => {
                    self.log(Level::Error, &format!("unexpected control request #{}", code));
                }
            }
        }

        self.report(ServiceStatus::StopPending);
        token.cancel();

        // A second stop request while waiting abandons the wait.
        let outcome = {
            let join = time::timeout(self.shutdown_timeout, self.controller.join());
            tokio::pin!(join);
            let mut commands_open = true;
            loop {
                tokio::select! {
                    biased;
                    outcome = &mut join => break Some(outcome),
                    command = commands.recv(), if commands_open => match command {
                        Some(ServiceCommand::Stop | ServiceCommand::Shutdown) => break None,
                        Some(ServiceCommand::Interrogate) => {
                            let _ = self.status_tx.send(ServiceStatus::StopPending);
                        }
                        Some(command) => tracing::debug!(
                            service = %self.name,
                            command = %command,
                            "Ignoring control request while stopping"
                        ),
                        None => commands_open = false,
                    },
                }
            }
        };

        let report = match outcome {
            Some(Ok(Ok(worker))) => {
                tracing::info!(service = %self.name, ticks = worker.ticks, "Worker stopped");
                HostReport {
                    worker: Some(worker),
                    timed_out: false,
                    forced: false,
                }
            }
            Some(Ok(Err(e))) => {
                self.log(Level::Error, &format!("worker did not stop cleanly: {}", e));
                HostReport {
                    worker: None,
                    timed_out: false,
                    forced: false,
                }
            }
            Some(Err(_)) => {
                self.log(
                    Level::Error,
                    &format!(
                        "worker did not stop within {}s",
                        self.shutdown_timeout.as_secs_f64()
                    ),
                );
                HostReport {
                    worker: None,
                    timed_out: true,
                    forced: false,
                }
            }
            None => {
                self.log(Level::Warn, "repeated stop request, not waiting for the worker");
                HostReport {
                    worker: None,
                    timed_out: false,
                    forced: true,
                }
            }
        };

        self.report(ServiceStatus::Stopped);
        tracing::info!(service = %self.name, "Service stopped");
        report
    }

    fn report(&self, status: ServiceStatus) {
        let _ = self.status_tx.send(status);
    }

    fn log(&self, level: Level, message: &str) {
        if let Err(e) = self.sink.write(level, message) {
            tracing::warn!(service = %self.name, error = %e, "Dropped host log record");
        }
    }
}
