//! Background tasks module
//! 
//! This module contains background tasks that run alongside the HTTP server.

pub mod tick_dispatcher;
pub mod wake_recovery;

// Re-export main functions
pub use tick_dispatcher::tick_dispatcher_task;
pub use wake_recovery::wake_recovery_task;
