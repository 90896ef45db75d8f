//! State management module
//! 
//! This module contains the timer data model, the host-side timer collection
//! and the persisted suspension timestamp.

pub mod app_state;
pub mod snapshot;
pub mod suspension_store;
pub mod timer_state;

// Re-export main types
pub use app_state::{AppState, CommandOutcome};
pub use snapshot::{ProgressSnapshot, TimerEvent, TimerSnapshot};
pub use suspension_store::SuspensionStore;
pub use timer_state::{TimerId, TimerState, TimerStatus};
