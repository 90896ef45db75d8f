//! Timer engine module
//!
//! This module contains the timer status machine, the engine executing its
//! effects, and the tick sources that drive it.

pub mod machine;
pub mod ticker;
pub mod timer_engine;

// Re-export main types
pub use machine::{dispatch, toggle_command, Command, Effect, Transition};
pub use ticker::{IntervalTicker, ManualTicker, TickEvent, TickSource, TICK_PERIOD};
pub use timer_engine::{TimerEngine, DEFAULT_CANVAS};
