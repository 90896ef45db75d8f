//! Wake-up recovery background task

use std::{sync::Arc, time::{Duration, Instant}};
use tokio::time::interval;
use tracing::{info, warn};

use crate::{state::AppState, utils::gap_seconds};

/// Seconds the machine spent asleep, if wall-clock time outran monotonic time
/// by at least `threshold`
pub fn detect_sleep(wall_elapsed: f64, monotonic_elapsed: f64, threshold: Duration) -> Option<f64> {
    let slept = (wall_elapsed - monotonic_elapsed).floor();
    (slept >= threshold.as_secs_f64() && slept > 0.0).then_some(slept)
}

/// Background task that checks for system wake-up and reconciles ticking timers.
///
/// Tick intervals run on the monotonic clock, which stands still while the
/// machine sleeps; the wall clock keeps going.
pub async fn wake_recovery_task(state: Arc<AppState>, check_every: Duration, threshold: Duration) {
    info!("Starting wake-up recovery task");

    let mut interval = interval(check_every);
    interval.tick().await;

    let mut last_wall = state.now();
    let mut last_monotonic = Instant::now();

    loop {
        interval.tick().await;

        let wall = state.now();
        let monotonic = Instant::now();
        let wall_elapsed = gap_seconds(last_wall, wall);
        let monotonic_elapsed = monotonic.duration_since(last_monotonic).as_secs_f64();
        last_wall = wall;
        last_monotonic = monotonic;

        if let Some(slept) = detect_sleep(wall_elapsed, monotonic_elapsed, threshold) {
            info!("System wake-up detected after {}s asleep", slept);
            if let Err(e) = state.recover_from_sleep(slept) {
                warn!("Failed to recover timers after wake-up: {}", e);
            }
        }
    }
}
