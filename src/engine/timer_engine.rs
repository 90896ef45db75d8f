//! Per-timer controller executing status machine effects

use std::sync::{Arc, Mutex, Weak};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::{
    machine::{dispatch, Command, Effect},
    ticker::TickSource,
};
use crate::{
    animation::{CanvasSize, DrawCommand, ProgressAnimator, Renderer},
    state::{TimerId, TimerState, TimerStatus},
    utils::gap_seconds,
};

/// Canvas assumed until a view with real geometry attaches
pub const DEFAULT_CANVAS: CanvasSize = CanvasSize {
    width: 60.0,
    height: 60.0,
};

/// Drives one [`TimerState`] through its lifecycle.
///
/// The engine owns the state, the progress animator and at most one armed
/// tick source. A view may be attached as a render target; the engine only
/// keeps a weak reference to it, so the view's lifetime stays with the host.
pub struct TimerEngine {
    id: TimerId,
    state: TimerState,
    animator: ProgressAnimator,
    ticker: Box<dyn TickSource>,
    view: Option<Weak<Mutex<dyn Renderer>>>,
}

impl TimerEngine {
    pub fn new(id: TimerId, state: TimerState, ticker: Box<dyn TickSource>) -> Self {
        let animator = ProgressAnimator::initialize(
            state.total_duration(),
            DEFAULT_CANVAS.width / 4.0,
            DEFAULT_CANVAS,
        );

        Self {
            id,
            state,
            animator,
            ticker,
            view: None,
        }
    }

    pub fn id(&self) -> TimerId {
        self.id
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn status(&self) -> TimerStatus {
        self.state.status()
    }

    pub fn animator(&self) -> &ProgressAnimator {
        &self.animator
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_running()
    }

    pub fn has_view(&self) -> bool {
        self.view
            .as_ref()
            .is_some_and(|view| view.strong_count() > 0)
    }

    /// Run `command` through the status machine and execute its effects.
    ///
    /// Returns `false` when the command is not valid in the current status;
    /// the timer is left untouched in that case.
    pub fn apply(&mut self, command: Command) -> bool {
        let Some(transition) = dispatch(&self.state, self.ticker.is_running(), &command) else {
            warn!(
                "Ignoring {:?} for timer {} in status {}",
                command,
                self.id,
                self.state.status()
            );
            return false;
        };

        let previous = self.state.status();
        for effect in transition.effects {
            self.execute(effect);
        }
        self.state.set_status(transition.status);

        if previous != transition.status {
            info!("Timer {} changed from {} to {}", self.id, previous, transition.status);
        }
        true
    }

    pub fn start(&mut self) -> bool {
        self.apply(Command::Start)
    }

    pub fn pause(&mut self) -> bool {
        self.apply(Command::Pause)
    }

    pub fn resume(&mut self) -> bool {
        self.apply(Command::Resume)
    }

    pub fn restart(&mut self) -> bool {
        self.apply(Command::Restart)
    }

    /// The row button press
    pub fn toggle(&mut self) -> bool {
        self.apply(Command::Toggle)
    }

    /// One second elapsed
    pub fn tick(&mut self) -> bool {
        let accepted = self.apply(Command::Tick);
        if accepted {
            debug!("Timer {} ticked, {}s remaining", self.id, self.state.remaining());
        }
        accepted
    }

    /// Deliver a tick from the tick source, dropping ticks from cancelled armings
    pub fn on_tick(&mut self, generation: u64) -> bool {
        if !self.ticker.is_running() || generation != self.ticker.generation() {
            debug!(
                "Dropping stale tick for timer {} (generation {}, current {})",
                self.id,
                generation,
                self.ticker.generation()
            );
            return false;
        }
        self.tick()
    }

    /// Stop ticking because the view or the whole app went away
    pub fn suspend(&mut self, at: DateTime<Utc>) -> bool {
        self.apply(Command::Suspend(at))
    }

    /// Subtract time that passed while the tick source was stopped
    pub fn reconcile_after_gap(&mut self, gap_seconds: f64) -> bool {
        self.apply(Command::Reconcile { gap_seconds })
    }

    /// Reconcile against the pending suspension point, then tick again if still running.
    ///
    /// The suspension point is consumed, so a second call finds no gap.
    pub fn resume_at(&mut self, now: DateTime<Utc>) {
        let gap = self
            .state
            .take_suspended()
            .map(|at| gap_seconds(at, now))
            .unwrap_or(0.0);
        self.resume_after(gap);
    }

    /// Same as [`resume_at`](Self::resume_at) with a gap measured by the host
    pub fn resume_with_gap(&mut self, gap_seconds: f64) {
        self.state.take_suspended();
        self.resume_after(gap_seconds);
    }

    fn resume_after(&mut self, gap: f64) {
        if gap > 0.0 {
            info!("Timer {} reconciling a {}s gap", self.id, gap);
            self.reconcile_after_gap(gap);
        }
        if self.state.status().is_active() {
            self.start();
        }
    }

    /// Seconds of the countdown consumed so far
    pub fn snapshot_elapsed(&self) -> f64 {
        self.state.elapsed()
    }

    /// Attach a render target and bring it up to date without animation
    pub fn attach_view(
        &mut self,
        view: &Arc<Mutex<dyn Renderer>>,
        canvas: CanvasSize,
        arc_thickness: f64,
    ) {
        self.animator =
            ProgressAnimator::initialize(self.state.total_duration(), arc_thickness, canvas);
        self.view = Some(Arc::downgrade(view));
        self.redraw();
    }

    pub fn detach_view(&mut self) {
        self.view = None;
    }

    /// Redraw the current progress in one go
    pub fn redraw(&mut self) {
        let command = if self.state.status() == TimerStatus::Completed {
            self.animator.mark_complete()
        } else if self.snapshot_elapsed() > 0.0 {
            self.animator.replay_to(self.snapshot_elapsed())
        } else {
            self.animator.reset()
        };
        self.draw(command);
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::StartTicking => self.ticker.start(),
            Effect::StopTicking => self.ticker.stop(),
            Effect::SetRemaining(seconds) => self.state.set_remaining(seconds),
            Effect::MarkSuspended(at) => self.state.mark_suspended(at),
            Effect::ClearSuspended => {
                self.state.take_suspended();
            }
            Effect::ClearProgress => {
                let command = self.animator.reset();
                self.draw(command);
            }
            Effect::AdvanceProgress => {
                let command = self.animator.advance_one_step();
                self.draw(command);
            }
            Effect::ReplayProgress(elapsed) => {
                let command = self.animator.replay_to(elapsed);
                self.draw(command);
            }
            Effect::CompleteProgress => {
                let command = self.animator.mark_complete();
                self.draw(command);
            }
        }
    }

    fn draw(&mut self, command: DrawCommand) {
        let Some(view) = self.view.as_ref().and_then(Weak::upgrade) else {
            return;
        };
        match view.lock() {
            Ok(mut renderer) => renderer.render(command),
            Err(e) => warn!("Failed to lock view of timer {}: {}", self.id, e),
        };
    }
}

impl Drop for TimerEngine {
    fn drop(&mut self) {
        self.ticker.stop();
        debug!("Timer {} disposed", self.id);
    }
}
