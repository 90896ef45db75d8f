//! Tick sources driving timer engines once per second

use std::time::Duration;

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{interval_at, Instant},
};
use tracing::{debug, warn};

use crate::state::TimerId;

/// Default spacing between two ticks
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// One elapsed second for one timer.
///
/// The generation identifies which arming of the tick source produced the
/// event, so ticks from a cancelled source can be told apart and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickEvent {
    pub timer: TimerId,
    pub generation: u64,
}

/// Periodic scheduling owned by a single engine
pub trait TickSource: Send {
    /// Arm the source, cancelling any previously armed one first
    fn start(&mut self);

    fn stop(&mut self);

    fn is_running(&self) -> bool;

    /// Bumped on every [`start`](Self::start)
    fn generation(&self) -> u64;
}

/// Tokio interval task forwarding ticks into a channel
#[derive(Debug)]
pub struct IntervalTicker {
    timer: TimerId,
    period: Duration,
    tx: mpsc::UnboundedSender<TickEvent>,
    task: Option<JoinHandle<()>>,
    generation: u64,
}

impl IntervalTicker {
    pub fn new(timer: TimerId, tx: mpsc::UnboundedSender<TickEvent>) -> Self {
        Self::with_period(timer, tx, TICK_PERIOD)
    }

    pub fn with_period(
        timer: TimerId,
        tx: mpsc::UnboundedSender<TickEvent>,
        period: Duration,
    ) -> Self {
        Self {
            timer,
            period,
            tx,
            task: None,
            generation: 0,
        }
    }
}

impl TickSource for IntervalTicker {
    fn start(&mut self) {
        self.stop();
        self.generation += 1;

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No tokio runtime available, tick source for timer {} not started", self.timer);
            return;
        };

        let event = TickEvent {
            timer: self.timer,
            generation: self.generation,
        };
        let period = self.period;
        let tx = self.tx.clone();

        self.task = Some(runtime.spawn(async move {
            // First tick one full period from now, not immediately
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if tx.send(event).is_err() {
                    debug!("Tick receiver closed, stopping tick source for timer {}", event.timer);
                    break;
                }
            }
        }));
        debug!("Tick source armed for timer {} (generation {})", self.timer, self.generation);
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("Tick source cancelled for timer {}", self.timer);
        }
    }

    fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for IntervalTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Tick source whose ticks are delivered by the host itself.
///
/// Useful when the host already has a frame loop, and in tests.
#[derive(Debug, Default)]
pub struct ManualTicker {
    running: bool,
    generation: u64,
    starts: u64,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times the source has been armed
    pub fn starts(&self) -> u64 {
        self.starts
    }
}

impl TickSource for ManualTicker {
    fn start(&mut self) {
        self.running = true;
        self.generation += 1;
        self.starts += 1;
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn generation(&self) -> u64 {
        self.generation
    }
}
