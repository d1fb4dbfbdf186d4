//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::io;
use std::sync::Arc;
use std::time::Duration;

use beep_service::config::ServiceSection;
use beep_service::lifecycle::{ServiceCommand, ServiceHost, ServiceStatus};
use beep_service::observability::{Level, MemorySink};
use beep_service::worker::{Beeper, LifecycleController, SilentBeeper, TickRates};
use tokio::sync::mpsc;

/// A controller with default rates, a silent beeper and an in-memory sink.
pub fn silent_controller() -> (LifecycleController, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let controller =
        LifecycleController::new(TickRates::default(), sink.clone(), Arc::new(SilentBeeper));
    (controller, sink)
}

/// Number of "beep" records written so far.
pub fn beeps(sink: &MemorySink) -> usize {
    sink.count(Level::Info, "beep")
}

/// Everything needed to drive a host from a test.
pub struct HostHarness {
    pub host: ServiceHost,
    pub sink: Arc<MemorySink>,
    pub commands: mpsc::UnboundedSender<ServiceCommand>,
    pub command_rx: mpsc::UnboundedReceiver<ServiceCommand>,
    pub statuses: mpsc::UnboundedReceiver<ServiceStatus>,
}

/// A host around a silent controller, named "test-service".
pub fn host_harness() -> HostHarness {
    host_harness_with(TickRates::default(), Arc::new(SilentBeeper))
}

pub fn host_harness_with(rates: TickRates, beeper: Arc<dyn Beeper>) -> HostHarness {
    let sink = Arc::new(MemorySink::new());
    let controller = LifecycleController::new(rates, sink.clone(), beeper);
    let service = ServiceSection {
        name: "test-service".to_string(),
        ..ServiceSection::default()
    };
    let (host, statuses) = ServiceHost::new(&service, controller, sink.clone());
    let (commands, command_rx) = mpsc::unbounded_channel();
    HostHarness {
        host,
        sink,
        commands,
        command_rx,
        statuses,
    }
}

/// Drain every status reported so far.
pub fn drain_statuses(rx: &mut mpsc::UnboundedReceiver<ServiceStatus>) -> Vec<ServiceStatus> {
    let mut out = Vec::new();
    while let Ok(status) = rx.try_recv() {
        out.push(status);
    }
    out
}

/// A beeper that blocks its thread for a long time on every beep.
pub struct StuckBeeper(pub Duration);

impl Beeper for StuckBeeper {
    fn beep(&self) -> io::Result<()> {
        std::thread::sleep(self.0);
        Ok(())
    }
}

/// A beeper that panics, taking the worker task down with it.
pub struct PanickingBeeper;

impl Beeper for PanickingBeeper {
    fn beep(&self) -> io::Result<()> {
        panic!("speaker on fire");
    }
}
