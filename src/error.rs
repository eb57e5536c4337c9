//! Error types for the cadence execution-state core
//!
//! Domain errors use thiserror; faults crossing the external effect-runtime
//! boundary are carried as anyhow errors.

use thiserror::Error;

use crate::exec::ExecutionStatus;

/// Rejected execution-state transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// The requested event has no edge from the current status
    #[error("invalid transition: '{event}' is not permitted from status '{from}'")]
    Invalid {
        /// Status the execution state was in when the event arrived
        from: ExecutionStatus,
        /// Name of the rejected event
        event: &'static str,
    },

    /// A step advance would exceed the declared step plan
    #[error("step advance past plan: {completed} of {planned} steps already completed")]
    StepOverflow {
        /// Steps completed so far
        completed: u64,
        /// Steps declared at start
        planned: u64,
    },
}

/// Convenience result alias for transition operations
pub type TransitionResult<T> = std::result::Result<T, TransitionError>;

/// Violated `ExecutionState` structural invariant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// Completed-step counter exceeds the declared plan
    #[error("completed steps ({completed}) exceed planned steps ({planned})")]
    CompletedExceedsPlanned {
        /// Steps recorded as completed
        completed: u64,
        /// Steps declared at start
        planned: u64,
    },

    /// End timestamp present outside a terminal status
    #[error("end time present but status '{0}' is not terminal")]
    EndTimeOutsideTerminal(ExecutionStatus),

    /// Terminal status without an end timestamp
    #[error("terminal status '{0}' is missing an end time")]
    TerminalWithoutEndTime(ExecutionStatus),

    /// Result value present outside the completed status
    #[error("result present but status is '{0}', not 'completed'")]
    ResultOutsideCompleted(ExecutionStatus),

    /// Error value present outside the error status
    #[error("error present but status is '{0}', not 'error'")]
    ErrorOutsideError(ExecutionStatus),

    /// Result and error are mutually exclusive
    #[error("result and error are both present")]
    ResultAndError,

    /// Current step recorded outside an active status
    #[error("current step present but status '{0}' is neither 'running' nor 'paused'")]
    StepOutsideActive(ExecutionStatus),
}

/// Convenience result alias for invariant checks
pub type InvariantResult = std::result::Result<(), InvariantViolation>;

/// Failure reported by the external effect-execution runtime
#[derive(Debug, Error)]
pub enum EffectError {
    /// The runtime refused to execute the step
    #[error("effect runtime rejected step '{step}': {reason}")]
    Rejected {
        /// Step identifier that was rejected
        step: String,
        /// Runtime-supplied rejection reason
        reason: String,
    },

    /// The runtime failed while executing the step
    #[error("effect runtime failure: {0}")]
    Runtime(#[from] anyhow::Error),
}

/// Convenience result alias for effect operations
pub type EffectResult<T> = std::result::Result<T, EffectError>;

/// Failure while driving a single step through the executor
#[derive(Debug, Error)]
pub enum StepError {
    /// The lifecycle transition for the step was rejected
    #[error("transition error: {0}")]
    Transition(#[from] TransitionError),

    /// The effect runtime failed or rejected the step
    #[error("effect error: {0}")]
    Effect(#[from] EffectError),
}

/// Convenience result alias for driver step operations
pub type StepResult<T> = std::result::Result<T, StepError>;
