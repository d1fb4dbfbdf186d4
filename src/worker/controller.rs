//! Worker lifecycle controller.
//!
//! # Responsibilities
//! - Spawn the run loop on its own task
//! - Hand the supervisor pause/continue handles
//! - Publish state changes and report completion
//!
//! # Design Decisions
//! - Pause and continue share one FIFO channel, so the loop sees them in send order
//! - Cancellation comes from a caller-supplied token and wins every race
//! - State is owned by the loop; the supervisor reads it through a watch channel
//! - Handles close when the loop drops its receiver, after the final state is published

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::observability::logging::{Level, LogSink};
use crate::observability::metrics;
use crate::worker::action::Beeper;
use crate::worker::ticker::RateTicker;
use crate::worker::types::{
    ControlSignal, TickInterval, TickRates, WorkerError, WorkerReport, WorkerState,
};

/// Owns one worker and its run loop.
pub struct LifecycleController {
    rates: TickRates,
    sink: Arc<dyn LogSink>,
    beeper: Arc<dyn Beeper>,
    /// Taken by the loop on start; `None` afterwards.
    state_tx: Option<watch::Sender<WorkerState>>,
    state_rx: watch::Receiver<WorkerState>,
    task: Option<JoinHandle<WorkerReport>>,
}

impl LifecycleController {
    pub fn new(rates: TickRates, sink: Arc<dyn LogSink>, beeper: Arc<dyn Beeper>) -> Self {
        let (state_tx, state_rx) = watch::channel(WorkerState::Idle);
        Self {
            rates,
            sink,
            beeper,
            state_tx: Some(state_tx),
            state_rx,
            task: None,
        }
    }

    /// Start the run loop at the fast rate.
    ///
    /// Can only succeed once per controller.
    pub fn start(
        &mut self,
        token: CancellationToken,
    ) -> Result<(PauseHandle, ContinueHandle), WorkerError> {
        let state_tx = self.state_tx.take().ok_or(WorkerError::AlreadyStarted)?;
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();

        let run_loop = RunLoop {
            ticker: RateTicker::new(self.rates, TickInterval::Fast),
            signals: signal_rx,
            signals_open: true,
            token,
            sink: self.sink.clone(),
            beeper: self.beeper.clone(),
            state_tx,
            ticks: 0,
            action_failures: 0,
            sink_failures: 0,
        };
        self.task = Some(tokio::spawn(run_loop.run()));

        let pause = PauseHandle(SignalSender {
            signal: ControlSignal::Pause,
            tx: signal_tx.clone(),
            state: self.state_rx.clone(),
        });
        let resume = ContinueHandle(SignalSender {
            signal: ControlSignal::Continue,
            tx: signal_tx,
            state: self.state_rx.clone(),
        });
        Ok((pause, resume))
    }

    /// Latest state published by the loop.
    pub fn state(&self) -> WorkerState {
        *self.state_rx.borrow()
    }

    /// Wait for the loop to exit. Only the first call after `start` returns the report.
    pub async fn join(&mut self) -> Result<WorkerReport, WorkerError> {
        let task = self.task.take().ok_or(WorkerError::NotStarted)?;
        task.await.map_err(|e| WorkerError::TaskFailed(e.to_string()))
    }
}

struct SignalSender {
    signal: ControlSignal,
    tx: mpsc::UnboundedSender<ControlSignal>,
    state: watch::Receiver<WorkerState>,
}

impl SignalSender {
    fn send(&self) -> Result<(), WorkerError> {
        let state = *self.state.borrow();
        if state.is_terminal() {
            return Err(WorkerError::InvalidTransition {
                signal: self.signal,
                state,
            });
        }
        self.tx
            .send(self.signal)
            .map_err(|_| WorkerError::InvalidTransition {
                signal: self.signal,
                state: WorkerState::Stopped,
            })
    }
}

/// Requests `Running(Slow)`.
pub struct PauseHandle(SignalSender);

impl PauseHandle {
    /// Queue a pause. Fails with `InvalidTransition` once the worker has stopped.
    pub fn send(&self) -> Result<(), WorkerError> {
        self.0.send()
    }

    /// True once the run loop has fully exited.
    pub fn is_closed(&self) -> bool {
        self.0.tx.is_closed()
    }

    /// Resolves once the run loop has fully exited.
    pub async fn closed(&self) {
        self.0.tx.closed().await
    }
}

/// Requests `Running(Fast)`.
pub struct ContinueHandle(SignalSender);

impl ContinueHandle {
    /// Queue a continue. Fails with `InvalidTransition` once the worker has stopped.
    pub fn send(&self) -> Result<(), WorkerError> {
        self.0.send()
    }

    /// True once the run loop has fully exited.
    pub fn is_closed(&self) -> bool {
        self.0.tx.is_closed()
    }

    /// Resolves once the run loop has fully exited.
    pub async fn closed(&self) {
        self.0.tx.closed().await
    }
}

enum Event {
    Tick,
    Signal(ControlSignal),
}

struct RunLoop {
    ticker: RateTicker,
    signals: mpsc::UnboundedReceiver<ControlSignal>,
    /// False once every handle has been dropped.
    signals_open: bool,
    token: CancellationToken,
    sink: Arc<dyn LogSink>,
    beeper: Arc<dyn Beeper>,
    state_tx: watch::Sender<WorkerState>,
    ticks: u64,
    action_failures: u64,
    sink_failures: u64,
}

impl RunLoop {
    async fn run(mut self) -> WorkerReport {
        self.publish(WorkerState::Running(self.ticker.active()));
        metrics::record_interval(self.ticker.period());
        self.log(
            Level::Info,
            &format!("worker started, ticking every {:?}", self.ticker.period()),
        );

        loop {
            match self.next_event().await {
                Event::Tick => self.on_tick(),
                Event::Signal(ControlSignal::Pause) => {
                    self.switch(ControlSignal::Pause, TickInterval::Slow)
                }
                Event::Signal(ControlSignal::Continue) => {
                    self.switch(ControlSignal::Continue, TickInterval::Fast)
                }
                Event::Signal(ControlSignal::Cancel) => break,
            }
        }

        metrics::record_control_signal(ControlSignal::Cancel);
        self.publish(WorkerState::Stopped);
        self.log(
            Level::Info,
            &format!("worker stopped after {} ticks", self.ticks),
        );

        let report = WorkerReport {
            ticks: self.ticks,
            action_failures: self.action_failures,
            sink_failures: self.sink_failures,
            final_state: WorkerState::Stopped,
        };
        // Dropping the receiver is what closes the supervisor's handles.
        drop(self);
        report
    }

    async fn next_event(&mut self) -> Event {
        loop {
            tokio::select! {
                biased;
                _ = self.token.cancelled() => return Event::Signal(ControlSignal::Cancel),
                signal = self.signals.recv(), if self.signals_open => match signal {
                    Some(signal) => return Event::Signal(signal),
                    None => self.signals_open = false,
                },
                _ = self.ticker.tick() => return Event::Tick,
            }
        }
    }

    fn on_tick(&mut self) {
        self.ticks += 1;
        metrics::record_tick(self.ticker.active());

        if let Err(e) = self.beeper.beep() {
            self.action_failures += 1;
            metrics::record_action_failure();
            self.log(Level::Error, &format!("periodic action failed: {}", e));
        }
        self.log(Level::Info, &format!("beep (tick {})", self.ticks));
    }

    fn switch(&mut self, signal: ControlSignal, interval: TickInterval) {
        metrics::record_control_signal(signal);
        if !self.ticker.select(interval) {
            self.log(
                Level::Debug,
                &format!("{} ignored, already at {} rate", signal, interval),
            );
            return;
        }
        self.publish(WorkerState::Running(interval));
        metrics::record_interval(self.ticker.period());
        self.log(
            Level::Info,
            &format!("{}: tick rate switched to {} ({:?})", signal, interval, self.ticker.period()),
        );
    }

    fn publish(&self, state: WorkerState) {
        // Errors only mean nobody is watching.
        let _ = self.state_tx.send(state);
    }

    fn log(&mut self, level: Level, message: &str) {
        if let Err(e) = self.sink.write(level, message) {
            self.sink_failures += 1;
            metrics::record_sink_failure();
            tracing::warn!(error = %WorkerError::SinkWriteFailure(e), "Dropped worker log record");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::logging::MemorySink;
    use crate::worker::action::SilentBeeper;
    use std::io;
    use std::time::Duration;
    use tokio::time::sleep;

    struct BrokenBeeper;

    impl Beeper for BrokenBeeper {
        fn beep(&self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "speaker unplugged"))
        }
    }

    fn controller(sink: Arc<MemorySink>) -> LifecycleController {
        LifecycleController::new(TickRates::default(), sink, Arc::new(SilentBeeper))
    }

    #[tokio::test(start_paused = true)]
    async fn test_starts_idle_then_runs_fast() {
        let sink = Arc::new(MemorySink::new());
        let mut controller = controller(sink);
        assert_eq!(controller.state(), WorkerState::Idle);

        let _handles = controller.start(CancellationToken::new()).unwrap();
        sleep(Duration::from_millis(1)).await;
        assert_eq!(controller.state(), WorkerState::Running(TickInterval::Fast));
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_start_fails_and_first_loop_continues() {
        let sink = Arc::new(MemorySink::new());
        let mut controller = controller(sink.clone());
        let token = CancellationToken::new();

        let _handles = controller.start(token.clone()).unwrap();
        let second = controller.start(token.clone());
        assert!(matches!(second, Err(WorkerError::AlreadyStarted)));

        sleep(Duration::from_millis(1200)).await;
        assert_eq!(controller.state(), WorkerState::Running(TickInterval::Fast));
        assert_eq!(sink.count(Level::Info, "beep"), 2);

        token.cancel();
        let report = controller.join().await.unwrap();
        assert_eq!(report.ticks, 2);
    }

    #[tokio::test]
    async fn test_join_before_start() {
        let mut controller = controller(Arc::new(MemorySink::new()));
        assert!(matches!(controller.join().await, Err(WorkerError::NotStarted)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggling_tracks_last_signal() {
        let mut controller = controller(Arc::new(MemorySink::new()));
        let token = CancellationToken::new();
        let (pause, resume) = controller.start(token.clone()).unwrap();

        let sequence = [
            ControlSignal::Pause,
            ControlSignal::Pause,
            ControlSignal::Continue,
            ControlSignal::Pause,
            ControlSignal::Continue,
            ControlSignal::Continue,
            ControlSignal::Pause,
        ];
        for signal in sequence {
            match signal {
                ControlSignal::Pause => pause.send().unwrap(),
                _ => resume.send().unwrap(),
            }
            sleep(Duration::from_millis(10)).await;

            let expected = if signal == ControlSignal::Pause {
                TickInterval::Slow
            } else {
                TickInterval::Fast
            };
            assert_eq!(controller.state(), WorkerState::Running(expected));
        }

        token.cancel();
        controller.join().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_to_back_signals_apply_in_order() {
        let mut controller = controller(Arc::new(MemorySink::new()));
        let token = CancellationToken::new();
        let (pause, resume) = controller.start(token.clone()).unwrap();

        resume.send().unwrap();
        pause.send().unwrap();
        sleep(Duration::from_millis(1)).await;
        assert_eq!(controller.state(), WorkerState::Running(TickInterval::Slow));

        pause.send().unwrap();
        resume.send().unwrap();
        sleep(Duration::from_millis(1)).await;
        assert_eq!(controller.state(), WorkerState::Running(TickInterval::Fast));

        token.cancel();
        controller.join().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_signals_after_cancel_are_rejected() {
        let sink = Arc::new(MemorySink::new());
        let mut controller = controller(sink.clone());
        let token = CancellationToken::new();
        let (pause, resume) = controller.start(token.clone()).unwrap();

        sleep(Duration::from_millis(600)).await;
        token.cancel();
        let report = controller.join().await.unwrap();
        assert_eq!(report.final_state, WorkerState::Stopped);

        let err = pause.send().unwrap_err();
        assert!(matches!(
            err,
            WorkerError::InvalidTransition {
                signal: ControlSignal::Pause,
                state: WorkerState::Stopped
            }
        ));
        assert!(resume.send().is_err());
        assert_eq!(controller.state(), WorkerState::Stopped);

        let beeps = sink.count(Level::Info, "beep");
        sleep(Duration::from_millis(2000)).await;
        assert_eq!(sink.count(Level::Info, "beep"), beeps);
    }

    #[tokio::test(start_paused = true)]
    async fn test_handles_close_only_after_exit() {
        let mut controller = controller(Arc::new(MemorySink::new()));
        let token = CancellationToken::new();
        let (pause, resume) = controller.start(token.clone()).unwrap();

        sleep(Duration::from_millis(700)).await;
        assert!(!pause.is_closed());
        assert!(!resume.is_closed());

        token.cancel();
        pause.closed().await;
        resume.closed().await;
        assert_eq!(controller.state(), WorkerState::Stopped);
        assert_eq!(controller.join().await.unwrap().ticks, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_handles_keep_loop_alive() {
        let sink = Arc::new(MemorySink::new());
        let mut controller = controller(sink.clone());
        let token = CancellationToken::new();
        let handles = controller.start(token.clone()).unwrap();
        drop(handles);

        sleep(Duration::from_millis(1200)).await;
        assert_eq!(sink.count(Level::Info, "beep"), 2);

        token.cancel();
        assert_eq!(controller.join().await.unwrap().ticks, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_do_not_stop_the_loop() {
        let sink = Arc::new(MemorySink::new());
        sink.set_failing(true);
        let mut controller =
            LifecycleController::new(TickRates::default(), sink.clone(), Arc::new(BrokenBeeper));
        let token = CancellationToken::new();
        let _handles = controller.start(token.clone()).unwrap();

        sleep(Duration::from_millis(1600)).await;
        assert_eq!(controller.state(), WorkerState::Running(TickInterval::Fast));

        sink.set_failing(false);
        token.cancel();
        let report = controller.join().await.unwrap();
        assert_eq!(report.ticks, 3);
        assert_eq!(report.action_failures, 3);
        // Start record plus an error and a beep record per tick.
        assert_eq!(report.sink_failures, 7);
        assert_eq!(sink.count(Level::Info, "worker stopped"), 1);
    }
}
