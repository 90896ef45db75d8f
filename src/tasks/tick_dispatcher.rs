//! Tick dispatcher background task

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::{engine::TickEvent, state::AppState};

/// Background task delivering tick events from every timer's tick source
pub async fn tick_dispatcher_task(state: Arc<AppState>, mut tick_rx: mpsc::UnboundedReceiver<TickEvent>) {
    info!("Starting tick dispatcher task");

    while let Some(event) = tick_rx.recv().await {
        if let Err(e) = state.handle_tick(event) {
            error!("Failed to deliver tick to timer {}: {}", event.timer, e);
        }
    }

    info!("All tick sources closed, tick dispatcher stopping");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        engine::Command,
        state::{SuspensionStore, TimerStatus},
        utils::SystemClock,
    };
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn dispatcher_drives_timer_to_completion() {
        let (state, tick_rx) = AppState::new(
            0,
            "127.0.0.1".to_string(),
            Arc::new(SystemClock),
            SuspensionStore::in_memory(),
        );
        let state = Arc::new(state);
        tokio::spawn(tick_dispatcher_task(Arc::clone(&state), tick_rx));

        let timer = state.add_timer(0, 0, 3).unwrap();
        state.command(timer.id, Command::Start).unwrap();

        tokio::time::sleep(Duration::from_millis(3_500)).await;

        let timer = state.get_timer(timer.id).unwrap();
        assert_eq!(timer.status, TimerStatus::Completed);
        assert_eq!(timer.remaining_seconds, 0.0);
        assert!(!timer.ticking);
    }
}
