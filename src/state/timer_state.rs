//! Timer state structure and lifecycle status

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a timer inside the host collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerId(pub u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of a countdown timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerStatus {
    NotStarted,
    Started,
    InProgress,
    Paused,
    Completed,
}

impl TimerStatus {
    /// Human readable status shown next to the countdown
    pub fn label(self) -> &'static str {
        match self {
            TimerStatus::NotStarted => "Not Started",
            TimerStatus::Started => "Started",
            TimerStatus::InProgress => "In Progress",
            TimerStatus::Paused => "Paused",
            TimerStatus::Completed => "Completed",
        }
    }

    /// Caption of the single row button for this status
    pub fn button_caption(self) -> &'static str {
        match self {
            TimerStatus::NotStarted | TimerStatus::Completed => "Start",
            TimerStatus::Started | TimerStatus::InProgress => "Pause",
            TimerStatus::Paused => "Resume",
        }
    }

    /// Whether time is counting down in this status
    pub fn is_active(self) -> bool {
        matches!(self, TimerStatus::Started | TimerStatus::InProgress)
    }
}

impl fmt::Display for TimerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Data model of one countdown timer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerState {
    total_duration: f64,
    remaining: f64,
    status: TimerStatus,
    suspended_at: Option<DateTime<Utc>>,
}

impl TimerState {
    /// Create a timer that has not been started yet.
    ///
    /// Negative or non-finite durations are clamped to zero.
    pub fn new(total_duration: f64) -> Self {
        let total_duration = clamp_non_negative(total_duration);
        Self {
            total_duration,
            remaining: total_duration,
            status: TimerStatus::NotStarted,
            suspended_at: None,
        }
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn suspended_at(&self) -> Option<DateTime<Utc>> {
        self.suspended_at
    }

    /// Seconds of the countdown already consumed
    pub fn elapsed(&self) -> f64 {
        self.total_duration - self.remaining
    }

    pub(crate) fn set_status(&mut self, status: TimerStatus) {
        self.status = status;
    }

    /// Keeps `remaining` inside `[0, total_duration]`
    pub(crate) fn set_remaining(&mut self, remaining: f64) {
        self.remaining = clamp_non_negative(remaining).min(self.total_duration);
    }

    pub(crate) fn mark_suspended(&mut self, at: DateTime<Utc>) {
        self.suspended_at = Some(at);
    }

    pub(crate) fn take_suspended(&mut self) -> Option<DateTime<Utc>> {
        self.suspended_at.take()
    }
}

/// Clamp to a finite, non-negative number
pub fn clamp_non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
