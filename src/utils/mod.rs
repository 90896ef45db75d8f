//! Utility functions module
//! 
//! This module contains utility functions used throughout the application.

pub mod clock;
pub mod format;
pub mod signals;

// Re-export main functions
pub use clock::{gap_seconds, Clock, ManualClock, SystemClock};
pub use format::format_remaining;
pub use signals::shutdown_signal;
