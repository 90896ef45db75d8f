//! Counter Timers - A list of independent countdown timers
//! 
//! This library provides the timer lifecycle state machine, the engine that
//! keeps remaining time accurate across suspensions, the progress arc
//! animator, and an HTTP host serving a list of timers.

pub mod animation;
pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use animation::ProgressAnimator;
pub use api::create_router;
pub use config::Config;
pub use engine::{Command, TimerEngine};
pub use error::AppError;
pub use state::{AppState, TimerState, TimerStatus};
pub use utils::signals::shutdown_signal;
