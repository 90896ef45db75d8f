//! Main application state management

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard,
    },
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info};

use super::{SuspensionStore, TimerEvent, TimerId, TimerSnapshot, TimerState};
use crate::{
    animation::{Canvas, CanvasSize, Renderer},
    engine::{Command, IntervalTicker, TickEvent, TimerEngine, DEFAULT_CANVAS},
    error::AppError,
    utils::{gap_seconds, Clock},
};

/// Longest duration the add-timer picker offers, in hours
pub const MAX_HOURS: u64 = 24;

/// A timer in the list together with the view currently showing it
struct TimerEntry {
    engine: TimerEngine,
    view: Option<Arc<Mutex<Canvas>>>,
}

impl TimerEntry {
    fn snapshot(&self, index: usize) -> TimerSnapshot {
        match &self.view {
            Some(view) => match view.lock() {
                Ok(canvas) => TimerSnapshot::capture(index, &self.engine, Some(&*canvas)),
                Err(_) => TimerSnapshot::capture(index, &self.engine, None),
            },
            None => TimerSnapshot::capture(index, &self.engine, None),
        }
    }

    fn attach(&mut self, canvas: CanvasSize, arc_thickness: f64) {
        let view = Arc::new(Mutex::new(Canvas::new()));
        let target: Arc<Mutex<dyn Renderer>> = view.clone();
        self.engine.attach_view(&target, canvas, arc_thickness);
        self.view = Some(view);
    }

    fn detach(&mut self) {
        self.engine.detach_view();
        self.view = None;
    }
}

/// Result of a user command on one timer
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub accepted: bool,
    pub timer: TimerSnapshot,
}

/// Host-side collection of independent timers
pub struct AppState {
    timers: Mutex<Vec<TimerEntry>>,
    next_id: AtomicU64,
    clock: Arc<dyn Clock>,
    store: SuspensionStore,
    tick_tx: mpsc::UnboundedSender<TickEvent>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Channel for timer updates
    pub timer_update_tx: broadcast::Sender<TimerEvent>,
}

impl AppState {
    /// Create the state together with the receiving end of all tick sources
    pub fn new(
        port: u16,
        host: String,
        clock: Arc<dyn Clock>,
        store: SuspensionStore,
    ) -> (Self, mpsc::UnboundedReceiver<TickEvent>) {
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let (timer_update_tx, _) = broadcast::channel(100);

        let state = Self {
            timers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            clock,
            store,
            tick_tx,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            timer_update_tx,
        };
        (state, tick_rx)
    }

    fn lock_timers(&self) -> Result<MutexGuard<'_, Vec<TimerEntry>>, AppError> {
        self.timers.lock().map_err(|_| AppError::Lock("timer list"))
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(self.clock.now());
        }
    }

    fn publish(&self, event: TimerEvent) {
        let id = event.timer_id();
        // No subscribers is the normal case
        if self.timer_update_tx.send(event).is_err() {
            debug!("No listeners for update of timer {}", id);
        }
    }

    fn notify(&self, snapshot: &TimerSnapshot) {
        self.publish(TimerEvent::Updated(snapshot.clone()));
    }

    /// Add a timer with a duration chosen in the hours/minutes/seconds picker
    pub fn add_timer(&self, hours: u64, minutes: u64, seconds: u64) -> Result<TimerSnapshot, AppError> {
        let total = duration_from_picker(hours, minutes, seconds)?;
        let id = TimerId(self.next_id.fetch_add(1, Ordering::Relaxed));

        let ticker = IntervalTicker::new(id, self.tick_tx.clone());
        let mut entry = TimerEntry {
            engine: TimerEngine::new(id, TimerState::new(total), Box::new(ticker)),
            view: None,
        };
        entry.attach(DEFAULT_CANVAS, DEFAULT_CANVAS.width / 4.0);

        let mut timers = self.lock_timers()?;
        timers.push(entry);
        let snapshot = timers[timers.len() - 1].snapshot(timers.len() - 1);
        drop(timers);

        info!("Added timer {} for {}s", id, total);
        self.record_action("add");
        self.notify(&snapshot);
        Ok(snapshot)
    }

    /// Remove a timer; its tick source is cancelled before this returns
    pub fn remove_timer(&self, id: TimerId) -> Result<(), AppError> {
        let mut timers = self.lock_timers()?;
        let index = position(&timers, id)?;
        let entry = timers.remove(index);
        drop(timers);
        drop(entry);

        info!("Removed timer {}", id);
        self.record_action("remove");
        self.publish(TimerEvent::Removed { id });
        Ok(())
    }

    pub fn list_timers(&self) -> Result<Vec<TimerSnapshot>, AppError> {
        let timers = self.lock_timers()?;
        Ok(timers
            .iter()
            .enumerate()
            .map(|(index, entry)| entry.snapshot(index))
            .collect())
    }

    pub fn get_timer(&self, id: TimerId) -> Result<TimerSnapshot, AppError> {
        let timers = self.lock_timers()?;
        let index = position(&timers, id)?;
        Ok(timers[index].snapshot(index))
    }

    /// Apply a user command; rejected commands leave the timer unchanged
    pub fn command(&self, id: TimerId, command: Command) -> Result<CommandOutcome, AppError> {
        self.with_timer(id, &format!("{:?}", command).to_lowercase(), |entry| {
            entry.engine.apply(command)
        })
    }

    /// The row's view went away, e.g. scrolled off screen
    pub fn detach_view(&self, id: TimerId) -> Result<CommandOutcome, AppError> {
        let now = self.clock.now();
        self.with_timer(id, "detach", |entry| {
            entry.engine.suspend(now);
            entry.detach();
            true
        })
    }

    /// A view shows the timer again: catch up on the gap, then redraw
    pub fn attach_view(
        &self,
        id: TimerId,
        canvas: CanvasSize,
        arc_thickness: Option<f64>,
    ) -> Result<CommandOutcome, AppError> {
        let now = self.clock.now();
        let thickness = arc_thickness.unwrap_or(canvas.width / 4.0);
        self.with_timer(id, "attach", |entry| {
            entry.engine.resume_at(now);
            entry.attach(canvas, thickness);
            true
        })
    }

    fn with_timer<F>(&self, id: TimerId, action: &str, apply: F) -> Result<CommandOutcome, AppError>
    where
        F: FnOnce(&mut TimerEntry) -> bool,
    {
        let mut timers = self.lock_timers()?;
        let index = position(&timers, id)?;
        let accepted = apply(&mut timers[index]);
        let snapshot = timers[index].snapshot(index);
        drop(timers);

        self.record_action(action);
        self.notify(&snapshot);
        Ok(CommandOutcome {
            accepted,
            timer: snapshot,
        })
    }

    /// Deliver one tick event from a tick source
    pub fn handle_tick(&self, event: TickEvent) -> Result<(), AppError> {
        let mut timers = self.lock_timers()?;
        let Ok(index) = position(&timers, event.timer) else {
            debug!("Tick for removed timer {} dropped", event.timer);
            return Ok(());
        };
        if !timers[index].engine.on_tick(event.generation) {
            return Ok(());
        }
        let snapshot = timers[index].snapshot(index);
        drop(timers);

        self.notify(&snapshot);
        Ok(())
    }

    /// The app lost focus: persist the moment and stop every visible timer.
    ///
    /// A second call before the next foreground keeps the first timestamp.
    pub fn enter_background(&self) -> Result<usize, AppError> {
        let now = self.clock.now();
        if self.store.peek().is_none() {
            self.store.record(now)?;
        }

        let mut timers = self.lock_timers()?;
        let snapshots: Vec<TimerSnapshot> = timers
            .iter_mut()
            .enumerate()
            .filter(|(_, entry)| entry.view.is_some() && entry.engine.status().is_active())
            .map(|(index, entry)| {
                entry.engine.suspend(now);
                entry.snapshot(index)
            })
            .collect();
        drop(timers);

        info!("Entered background at {}, suspended {} timers", now, snapshots.len());
        self.record_action("background");
        for snapshot in &snapshots {
            self.notify(snapshot);
        }
        Ok(snapshots.len())
    }

    /// The app regained focus: reconcile visible timers with the time spent away
    pub fn enter_foreground(&self) -> Result<f64, AppError> {
        let Some(since) = self.store.take()? else {
            debug!("Foreground without a recorded suspension");
            return Ok(0.0);
        };
        let gap = gap_seconds(since, self.clock.now());

        let mut timers = self.lock_timers()?;
        let snapshots: Vec<TimerSnapshot> = timers
            .iter_mut()
            .enumerate()
            .filter(|(_, entry)| entry.view.is_some())
            .map(|(index, entry)| {
                entry.engine.resume_with_gap(gap);
                entry.engine.redraw();
                entry.snapshot(index)
            })
            .collect();
        drop(timers);

        info!("Entered foreground after {}s away", gap);
        self.record_action("foreground");
        for snapshot in &snapshots {
            self.notify(snapshot);
        }
        Ok(gap)
    }

    /// The whole machine slept while timers were ticking; account for the lost seconds
    pub fn recover_from_sleep(&self, gap: f64) -> Result<usize, AppError> {
        let now = self.clock.now();
        let mut timers = self.lock_timers()?;
        let snapshots: Vec<TimerSnapshot> = timers
            .iter_mut()
            .enumerate()
            .filter(|(_, entry)| entry.engine.is_ticking())
            .map(|(index, entry)| {
                entry.engine.suspend(now);
                entry.engine.resume_with_gap(gap);
                entry.engine.redraw();
                entry.snapshot(index)
            })
            .collect();
        drop(timers);

        if !snapshots.is_empty() {
            info!("Recovered {} timers after {}s of system sleep", snapshots.len(), gap);
        }
        for snapshot in &snapshots {
            self.notify(snapshot);
        }
        Ok(snapshots.len())
    }

    /// Current time on the injected clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn is_backgrounded(&self) -> bool {
        self.store.peek().is_some()
    }

    pub fn timer_count(&self) -> usize {
        self.timers.lock().map(|timers| timers.len()).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.timer_update_tx.subscribe()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

fn position(timers: &[TimerEntry], id: TimerId) -> Result<usize, AppError> {
    timers
        .iter()
        .position(|entry| entry.engine.id() == id)
        .ok_or(AppError::TimerNotFound(id))
}

/// Total seconds for a picker selection, rejecting empty or out-of-range picks
pub fn duration_from_picker(hours: u64, minutes: u64, seconds: u64) -> Result<f64, AppError> {
    if hours > MAX_HOURS || minutes > 59 || seconds > 59 {
        return Err(AppError::InvalidDuration(format!(
            "{}h {}m {}s is outside the picker range",
            hours, minutes, seconds
        )));
    }
    let total = hours * 3600 + minutes * 60 + seconds;
    if total == 0 {
        return Err(AppError::InvalidDuration("duration must be positive".to_string()));
    }
    Ok(total as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{engine::TimerEngine, state::TimerStatus, utils::ManualClock};
    use chrono::TimeZone;

    fn state_with_clock() -> (AppState, Arc<ManualClock>, mpsc::UnboundedReceiver<TickEvent>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
        ));
        let (state, rx) = AppState::new(0, "127.0.0.1".to_string(), clock.clone(), SuspensionStore::in_memory());
        (state, clock, rx)
    }

    #[test]
    fn picker_rejects_empty_and_out_of_range() {
        assert!(duration_from_picker(0, 0, 0).is_err());
        assert!(duration_from_picker(0, 60, 0).is_err());
        assert!(duration_from_picker(25, 0, 0).is_err());
        assert_eq!(duration_from_picker(1, 2, 3).unwrap(), 3723.0);
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_flow_through_the_channel() {
        let (state, _clock, mut rx) = state_with_clock();
        let timer = state.add_timer(0, 0, 3).unwrap();
        state.command(timer.id, Command::Start).unwrap();

        let event = rx.recv().await.unwrap();
        state.handle_tick(event).unwrap();

        let snapshot = state.get_timer(timer.id).unwrap();
        assert_eq!(snapshot.status, TimerStatus::InProgress);
        assert_eq!(snapshot.remaining_seconds, 2.0);
        assert_eq!(snapshot.progress.layers, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn detached_timer_catches_up_on_attach() {
        let (state, clock, _rx) = state_with_clock();
        let timer = state.add_timer(0, 1, 0).unwrap();
        state.command(timer.id, Command::Start).unwrap();

        let detached = state.detach_view(timer.id).unwrap();
        assert!(!detached.timer.ticking);
        assert!(!detached.timer.attached);

        clock.advance_secs(15);
        let attached = state
            .attach_view(timer.id, CanvasSize::new(80.0, 80.0), None)
            .unwrap();
        assert_eq!(attached.timer.remaining_seconds, 45.0);
        assert_eq!(attached.timer.status, TimerStatus::InProgress);
        assert!(attached.timer.ticking);
        assert_eq!(attached.timer.progress.end_angle, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn background_gap_completes_short_timers() {
        let (state, clock, _rx) = state_with_clock();
        let short = state.add_timer(0, 0, 10).unwrap();
        let long = state.add_timer(0, 5, 0).unwrap();
        let idle = state.add_timer(0, 0, 30).unwrap();
        state.command(short.id, Command::Start).unwrap();
        state.command(long.id, Command::Start).unwrap();

        assert_eq!(state.enter_background().unwrap(), 2);
        assert!(state.is_backgrounded());

        clock.advance_secs(20);
        assert_eq!(state.enter_foreground().unwrap(), 20.0);
        assert!(!state.is_backgrounded());

        let short = state.get_timer(short.id).unwrap();
        assert_eq!(short.status, TimerStatus::Completed);
        assert!(short.progress.complete);

        let long = state.get_timer(long.id).unwrap();
        assert_eq!(long.remaining_seconds, 280.0);
        assert!(long.ticking);

        let idle = state.get_timer(idle.id).unwrap();
        assert_eq!(idle.status, TimerStatus::NotStarted);
        assert_eq!(idle.remaining_seconds, 30.0);
    }

    #[tokio::test(start_paused = true)]
    async fn removed_timer_ignores_late_ticks() {
        let (state, _clock, _rx) = state_with_clock();
        let timer = state.add_timer(0, 0, 5).unwrap();
        state.command(timer.id, Command::Start).unwrap();
        state.remove_timer(timer.id).unwrap();

        state
            .handle_tick(TickEvent { timer: timer.id, generation: 1 })
            .unwrap();
        assert!(matches!(state.get_timer(timer.id), Err(AppError::TimerNotFound(_))));
        assert_eq!(state.timer_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn lifecycle_changes_reach_subscribers() {
        let (state, _clock, _rx) = state_with_clock();
        let timer = state.add_timer(0, 1, 0).unwrap();
        state.command(timer.id, Command::Start).unwrap();

        let mut updates = state.subscribe();
        assert_eq!(state.recover_from_sleep(20.0).unwrap(), 1);
        match updates.try_recv().unwrap() {
            TimerEvent::Updated(snapshot) => {
                assert_eq!(snapshot.remaining_seconds, 40.0);
                assert!(snapshot.ticking);
            }
            other => panic!("expected update, got {:?}", other),
        }

        assert_eq!(state.enter_background().unwrap(), 1);
        match updates.try_recv().unwrap() {
            TimerEvent::Updated(snapshot) => assert!(!snapshot.ticking),
            other => panic!("expected update, got {:?}", other),
        }

        state.remove_timer(timer.id).unwrap();
        assert_eq!(
            updates.try_recv().unwrap(),
            TimerEvent::Removed { id: timer.id }
        );
        assert!(updates.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_background_keeps_first_timestamp() {
        let (state, clock, _rx) = state_with_clock();
        let timer = state.add_timer(0, 1, 0).unwrap();
        state.command(timer.id, Command::Start).unwrap();

        state.enter_background().unwrap();
        clock.advance_secs(10);
        assert_eq!(state.enter_background().unwrap(), 1);

        clock.advance_secs(5);
        assert_eq!(state.enter_foreground().unwrap(), 15.0);
        assert_eq!(state.get_timer(timer.id).unwrap().remaining_seconds, 45.0);
    }

    #[test]
    fn engine_type_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<TimerEngine>();
    }
}
