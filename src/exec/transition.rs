//! Transition table for the execution-state lifecycle
//!
//! `apply` is a pure function from a state and an event to the next state.
//! Edges not in the table are rejected; the caller decides whether to
//! commit the result. Timestamps travel on the events so callers control
//! the clock.

use chrono::{DateTime, Utc};

use super::{ExecutionState, ExecutionStatus};
use crate::error::{TransitionError, TransitionResult};
use crate::types::ContextValue;

/// Lifecycle event an executor may request
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionEvent {
    /// Begin a run: `idle -> running`
    Start {
        /// Run start timestamp, recorded as `metadata.start_time`
        at: DateTime<Utc>,
        /// Declared number of steps; zero when unknown
        step_count: u64,
    },
    /// Complete one step and move to the next: `running -> running`
    StepAdvance {
        /// Identifier of the step now in flight
        step: String,
    },
    /// Suspend the run: `running -> paused`
    Pause,
    /// Continue a suspended run: `paused -> running`
    Resume,
    /// Finish successfully: `running -> completed`
    FinishOk {
        /// Final run value
        result: ContextValue,
        /// Termination timestamp
        at: DateTime<Utc>,
    },
    /// Finish with a failure: `running`/`paused` `-> error`
    FinishError {
        /// Failure description
        error: String,
        /// Termination timestamp
        at: DateTime<Utc>,
    },
    /// Return a finished run to defaults: `completed`/`error` `-> idle`
    Reset,
}

impl TransitionEvent {
    /// Stable name of the event, used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start { .. } => "start",
            Self::StepAdvance { .. } => "step-advance",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::FinishOk { .. } => "finish-ok",
            Self::FinishError { .. } => "finish-error",
            Self::Reset => "reset",
        }
    }
}

/// Apply `event` to `state`, producing the next state or rejecting the edge
///
/// Never mutates `state`; an `Err` means the caller has nothing to commit.
pub fn apply(state: &ExecutionState, event: TransitionEvent) -> TransitionResult<ExecutionState> {
    use ExecutionStatus::{Completed, Error, Idle, Paused, Running};

    match (state.status, event) {
        (Idle, TransitionEvent::Start { at, step_count }) => {
            let mut next = state.clone();
            next.status = Running;
            next.result = None;
            next.error = None;
            next.metadata.start_time = Some(at);
            next.metadata.end_time = None;
            next.metadata.duration_ms = None;
            next.metadata.step_count = step_count;
            next.metadata.completed_steps = 0;
            Ok(next)
        }

        (Running, TransitionEvent::StepAdvance { step }) => {
            let planned = state.metadata.step_count;
            let completed = state.metadata.completed_steps;
            if planned > 0 && completed >= planned {
                return Err(TransitionError::StepOverflow { completed, planned });
            }
            let mut next = state.clone();
            next.metadata.completed_steps = completed + 1;
            next.current_step = Some(step);
            Ok(next)
        }

        (Running, TransitionEvent::Pause) => {
            // Current step is retained across the suspension
            let mut next = state.clone();
            next.status = Paused;
            Ok(next)
        }

        (Paused, TransitionEvent::Resume) => {
            let mut next = state.clone();
            next.status = Running;
            Ok(next)
        }

        (Running, TransitionEvent::FinishOk { result, at }) => {
            let mut next = state.clone();
            next.status = Completed;
            next.current_step = None;
            next.result = Some(result);
            next.metadata.end_time = Some(at);
            next.metadata.duration_ms = duration_since_start(state, at);
            Ok(next)
        }

        (Running | Paused, TransitionEvent::FinishError { error, at }) => {
            let mut next = state.clone();
            next.status = Error;
            next.current_step = None;
            next.error = Some(error);
            next.metadata.end_time = Some(at);
            next.metadata.duration_ms = duration_since_start(state, at);
            Ok(next)
        }

        (Completed | Error, TransitionEvent::Reset) => Ok(ExecutionState::default()),

        (from, event) => Err(TransitionError::Invalid {
            from,
            event: event.name(),
        }),
    }
}

fn duration_since_start(state: &ExecutionState, end: DateTime<Utc>) -> Option<i64> {
    state
        .metadata
        .start_time
        .map(|start| (end - start).num_milliseconds())
}
