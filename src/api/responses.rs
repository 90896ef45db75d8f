//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{CommandOutcome, TimerSnapshot};

/// Body of POST /timers, the add-timer picker selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AddTimerRequest {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

/// Body of POST /timers/:id/attach, the geometry of the view showing the timer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachRequest {
    pub width: f64,
    pub height: f64,
    pub thickness: Option<f64>,
}

/// API response structure for timer command endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: Option<TimerSnapshot>,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: &str, message: String, timer: Option<TimerSnapshot>) -> Self {
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            timer,
        }
    }

    /// Response for a command run through a timer engine
    pub fn from_outcome(action: &str, outcome: CommandOutcome) -> Self {
        if outcome.accepted {
            Self::new(
                "accepted",
                format!("Timer {} {}", outcome.timer.id, action),
                Some(outcome.timer),
            )
        } else {
            Self::new(
                "ignored",
                format!(
                    "Timer {} cannot {} while {}",
                    outcome.timer.id, action, outcome.timer.status_label
                ),
                Some(outcome.timer),
            )
        }
    }
}

/// Response for app background/foreground transitions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub suspended_timers: Option<usize>,
    pub gap_seconds: Option<f64>,
}

/// Overall status of the timer list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timers: Vec<TimerSnapshot>,
    pub backgrounded: bool,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
