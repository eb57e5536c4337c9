//! Execution-state model for a step-wise IR executor
//!
//! `ExecutionState` is the payload an executor stores inside a
//! `StateManager` while interpreting an IR program. The executor replaces
//! the whole value through the container's update operation; it never
//! patches fields in place. Transition discipline lives in [`transition`],
//! and [`driver::ExecutionDriver`] enforces it before anything is committed.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{InvariantResult, InvariantViolation};
use crate::types::{Context, ContextValue};

pub mod driver;
pub mod transition;

/// Lifecycle status of an executor run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// No run in flight; the initial status
    Idle,
    /// Steps are being executed
    Running,
    /// Execution suspended mid-run; the current step is retained
    Paused,
    /// Run finished successfully; terminal
    Completed,
    /// Run finished with a failure; terminal
    Error,
}

impl ExecutionStatus {
    /// Whether this status ends the run (`completed` or `error`)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    /// Whether a step may legitimately be in flight (`running` or `paused`)
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }

    /// Stable lowercase name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timing and progress bookkeeping for a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ExecutionMetadata {
    /// When the run entered `running`; absent while idle
    pub start_time: Option<DateTime<Utc>>,
    /// When the run reached a terminal status; absent otherwise
    pub end_time: Option<DateTime<Utc>>,
    /// Wall-clock run duration in milliseconds, set on termination
    pub duration_ms: Option<i64>,
    /// Steps declared at start; zero when the plan length is unknown
    pub step_count: u64,
    /// Steps completed so far
    pub completed_steps: u64,
}

/// Full execution state carried through the container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionState {
    /// Lifecycle status driving the run
    pub status: ExecutionStatus,
    /// Identifier of the IR step in flight; present only while active
    pub current_step: Option<String>,
    /// The executor's mutable working memory
    pub context: Context,
    /// Final value; set only when `status` is `completed`
    pub result: Option<ContextValue>,
    /// Failure description; set only when `status` is `error`
    pub error: Option<String>,
    /// Timing and progress bookkeeping
    pub metadata: ExecutionMetadata,
}

impl Default for ExecutionState {
    fn default() -> Self {
        Self {
            status: ExecutionStatus::Idle,
            current_step: None,
            context: Context::new(),
            result: None,
            error: None,
            metadata: ExecutionMetadata::default(),
        }
    }
}

impl ExecutionState {
    /// Default-construct an idle state: empty context, zeroed counters, no
    /// timestamps, no result or error
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the run has reached a terminal status
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Validate the structural invariants of the model
    ///
    /// Checks the counter bound, the end-time/terminal correspondence,
    /// result/error exclusivity and their status implications, and the
    /// current-step presence rule. The container never calls this; it is
    /// for executors and validation layers that want to reject a malformed
    /// value before committing it.
    pub fn check_invariants(&self) -> InvariantResult {
        let metadata = &self.metadata;

        if metadata.step_count > 0 && metadata.completed_steps > metadata.step_count {
            return Err(InvariantViolation::CompletedExceedsPlanned {
                completed: metadata.completed_steps,
                planned: metadata.step_count,
            });
        }

        if metadata.end_time.is_some() && !self.status.is_terminal() {
            return Err(InvariantViolation::EndTimeOutsideTerminal(self.status));
        }
        if self.status.is_terminal() && metadata.end_time.is_none() {
            return Err(InvariantViolation::TerminalWithoutEndTime(self.status));
        }

        if self.result.is_some() && self.error.is_some() {
            return Err(InvariantViolation::ResultAndError);
        }
        if self.result.is_some() && self.status != ExecutionStatus::Completed {
            return Err(InvariantViolation::ResultOutsideCompleted(self.status));
        }
        if self.error.is_some() && self.status != ExecutionStatus::Error {
            return Err(InvariantViolation::ErrorOutsideError(self.status));
        }

        if self.current_step.is_some() && !self.status.is_active() {
            return Err(InvariantViolation::StepOutsideActive(self.status));
        }

        Ok(())
    }
}
