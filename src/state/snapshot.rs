//! Render-ready view of a timer row

use serde::{Deserialize, Serialize};

use super::{TimerId, TimerStatus};
use crate::{animation::Canvas, engine::TimerEngine, utils::format_remaining};

/// Progress arc as currently drawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub start_angle: f64,
    pub end_angle: f64,
    pub degrees_per_second: f64,
    pub complete: bool,
    pub layers: usize,
}

/// Everything a row needs to display one timer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub id: TimerId,
    pub row: usize,
    pub title: String,
    pub status: TimerStatus,
    pub status_label: String,
    pub button: String,
    pub remaining: String,
    pub remaining_seconds: f64,
    pub total_seconds: f64,
    pub ticking: bool,
    pub attached: bool,
    pub progress: ProgressSnapshot,
}

impl TimerSnapshot {
    /// Build the snapshot of the timer shown at zero-based `index`
    pub fn capture(index: usize, engine: &TimerEngine, view: Option<&Canvas>) -> Self {
        let state = engine.state();
        let status = state.status();
        let animator = engine.animator();

        Self {
            id: engine.id(),
            row: index + 1,
            title: format!("{}.", index + 1),
            status,
            status_label: status.label().to_string(),
            button: status.button_caption().to_string(),
            remaining: format_remaining(state.remaining()),
            remaining_seconds: state.remaining(),
            total_seconds: state.total_duration(),
            ticking: engine.is_ticking(),
            attached: view.is_some(),
            progress: ProgressSnapshot {
                start_angle: animator.start_angle(),
                end_angle: animator.end_angle(),
                degrees_per_second: animator.degrees_per_second(),
                complete: view.map_or(status == TimerStatus::Completed, Canvas::is_complete),
                layers: view.map_or(0, |canvas| canvas.layers().len()),
            },
        }
    }
}

/// Change pushed to subscribers of the timer list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TimerEvent {
    /// A timer was added or changed
    Updated(TimerSnapshot),
    /// A timer left the list
    Removed { id: TimerId },
}

impl TimerEvent {
    pub fn timer_id(&self) -> TimerId {
        match self {
            TimerEvent::Updated(snapshot) => snapshot.id,
            TimerEvent::Removed { id } => *id,
        }
    }

    /// Name used for the server-sent event
    pub fn name(&self) -> &'static str {
        match self {
            TimerEvent::Updated(_) => "timer",
            TimerEvent::Removed { .. } => "removed",
        }
    }
}
