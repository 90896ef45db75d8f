//! Timer status machine
//!
//! [`dispatch`] is a pure function from the current timer state and a command
//! to the next status plus the effects needed to get there. The
//! [`TimerEngine`](super::TimerEngine) executes the effects.

use chrono::{DateTime, Utc};

use crate::state::{timer_state::clamp_non_negative, TimerState, TimerStatus};

/// Input to the status machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// User start; also resumes a paused or suspended timer
    Start,
    Pause,
    Resume,
    /// Start again after completion
    Restart,
    /// The row button: whichever of start/pause/resume/restart the status calls for
    Toggle,
    /// One second elapsed on the tick source
    Tick,
    /// Ticking stops because the view or the app went away
    Suspend(DateTime<Utc>),
    /// Account for seconds that passed while nothing was ticking
    Reconcile { gap_seconds: f64 },
}

/// Side effect requested by a transition, executed in order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    StartTicking,
    StopTicking,
    SetRemaining(f64),
    MarkSuspended(DateTime<Utc>),
    ClearSuspended,
    ClearProgress,
    AdvanceProgress,
    ReplayProgress(f64),
    CompleteProgress,
}

/// Result of dispatching a command
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub status: TimerStatus,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn new(status: TimerStatus, effects: Vec<Effect>) -> Self {
        Self { status, effects }
    }

    fn stay(status: TimerStatus) -> Self {
        Self::new(status, Vec::new())
    }
}

/// Map the row button press to the command it stands for
pub fn toggle_command(status: TimerStatus) -> Command {
    match status {
        TimerStatus::NotStarted => Command::Start,
        TimerStatus::Started | TimerStatus::InProgress => Command::Pause,
        TimerStatus::Paused => Command::Resume,
        TimerStatus::Completed => Command::Restart,
    }
}

/// Compute the transition for `command`.
///
/// `ticking` tells whether a tick source is currently armed for this timer.
/// Returns `None` when the command is not valid in the current status; the
/// caller is expected to leave the timer untouched in that case.
pub fn dispatch(state: &TimerState, ticking: bool, command: &Command) -> Option<Transition> {
    let status = state.status();

    match *command {
        Command::Toggle => dispatch(state, ticking, &toggle_command(status)),

        Command::Start => match status {
            TimerStatus::NotStarted | TimerStatus::Completed => Some(begin(state)),
            TimerStatus::Paused => Some(resume_ticking(state)),
            TimerStatus::Started | TimerStatus::InProgress if ticking => Some(Transition::stay(status)),
            TimerStatus::Started | TimerStatus::InProgress => Some(resume_ticking(state)),
        },

        Command::Resume => match status {
            TimerStatus::Paused => Some(resume_ticking(state)),
            _ => None,
        },

        Command::Restart => match status {
            TimerStatus::Completed => Some(begin(state)),
            _ => None,
        },

        Command::Pause => match status {
            TimerStatus::Started | TimerStatus::InProgress => Some(Transition::new(
                TimerStatus::Paused,
                vec![Effect::StopTicking, Effect::ClearSuspended],
            )),
            _ => None,
        },

        Command::Tick => {
            if !status.is_active() || !ticking {
                return None;
            }
            let remaining = (state.remaining() - 1.0).max(0.0);
            if remaining <= 0.0 {
                Some(Transition::new(
                    TimerStatus::Completed,
                    vec![
                        Effect::SetRemaining(0.0),
                        Effect::StopTicking,
                        Effect::AdvanceProgress,
                        Effect::CompleteProgress,
                    ],
                ))
            } else {
                Some(Transition::new(
                    TimerStatus::InProgress,
                    vec![Effect::SetRemaining(remaining), Effect::AdvanceProgress],
                ))
            }
        }

        Command::Suspend(at) => {
            if !status.is_active() {
                return Some(Transition::stay(status));
            }
            let mut effects = Vec::new();
            if ticking {
                effects.push(Effect::StopTicking);
            }
            // An earlier suspension point already covers this one
            if state.suspended_at().is_none() {
                effects.push(Effect::MarkSuspended(at));
            }
            Some(Transition::new(status, effects))
        }

        Command::Reconcile { gap_seconds } => {
            if !status.is_active() {
                return Some(Transition::stay(status));
            }
            if ticking {
                return None;
            }
            let gap = clamp_non_negative(gap_seconds);
            if gap == 0.0 {
                return Some(Transition::stay(status));
            }
            let remaining = (state.remaining() - gap).max(0.0);
            if remaining <= 0.0 {
                Some(Transition::new(
                    TimerStatus::Completed,
                    vec![
                        Effect::SetRemaining(0.0),
                        Effect::ClearSuspended,
                        Effect::CompleteProgress,
                    ],
                ))
            } else {
                Some(Transition::new(
                    status,
                    vec![Effect::SetRemaining(remaining), Effect::ClearSuspended],
                ))
            }
        }
    }
}

/// Fresh run from a full countdown
fn begin(state: &TimerState) -> Transition {
    if state.total_duration() <= 0.0 {
        return Transition::new(
            TimerStatus::Completed,
            vec![
                Effect::SetRemaining(0.0),
                Effect::ClearSuspended,
                Effect::CompleteProgress,
            ],
        );
    }

    Transition::new(
        TimerStatus::Started,
        vec![
            Effect::SetRemaining(state.total_duration()),
            Effect::ClearSuspended,
            Effect::ClearProgress,
            Effect::StartTicking,
        ],
    )
}

/// Continue a run that was paused or suspended mid-way
fn resume_ticking(state: &TimerState) -> Transition {
    Transition::new(
        TimerStatus::InProgress,
        vec![
            Effect::ClearSuspended,
            Effect::StartTicking,
            Effect::ReplayProgress(state.elapsed()),
        ],
    )
}
