//! Validating driver for an execution run
//!
//! `ExecutionDriver` is the decorator that keeps the container
//! transition-agnostic while the lifecycle stays disciplined: every mutation
//! routes through the transition table via `try_update`, so an off-table
//! request is rejected before anything is committed and no listeners fire.

use std::rc::Rc;

use chrono::Utc;

use super::transition::{self, TransitionEvent};
use super::ExecutionState;
use crate::effect::{EffectAdapter, EffectRuntime};
use crate::error::{StepError, StepResult, TransitionError, TransitionResult};
use crate::store::StateManager;
use crate::store::view::StateView;
use crate::types::ContextValue;

/// Drives an `ExecutionState` through its lifecycle inside a `StateManager`
pub struct ExecutionDriver {
    state: Rc<StateManager<ExecutionState>>,
}

impl ExecutionDriver {
    /// Create a driver seeded with the default idle state
    pub fn new() -> Self {
        Self::with_initial(ExecutionState::default())
    }

    /// Create a driver seeded with a specific state
    pub fn with_initial(initial: ExecutionState) -> Self {
        Self {
            state: Rc::new(StateManager::new(initial)),
        }
    }

    /// The underlying container, for callers that need full access
    pub fn manager(&self) -> &Rc<StateManager<ExecutionState>> {
        &self.state
    }

    /// Read-only view for observer layers
    pub fn view(&self) -> StateView<ExecutionState> {
        self.state.view()
    }

    /// Current execution state
    pub fn state(&self) -> ExecutionState {
        self.state.get()
    }

    /// Begin a run with `step_count` planned steps (zero when unknown)
    pub fn start(&self, step_count: u64) -> TransitionResult<()> {
        self.apply(TransitionEvent::Start {
            at: Utc::now(),
            step_count,
        })
    }

    /// Record completion of the previous step and mark `step` in flight
    pub fn advance(&self, step: impl Into<String>) -> TransitionResult<()> {
        self.apply(TransitionEvent::StepAdvance { step: step.into() })
    }

    /// Suspend the run, retaining the step in flight
    pub fn pause(&self) -> TransitionResult<()> {
        self.apply(TransitionEvent::Pause)
    }

    /// Continue a suspended run
    pub fn resume(&self) -> TransitionResult<()> {
        self.apply(TransitionEvent::Resume)
    }

    /// Finish the run successfully with `result`
    pub fn complete(&self, result: ContextValue) -> TransitionResult<()> {
        self.apply(TransitionEvent::FinishOk {
            result,
            at: Utc::now(),
        })
    }

    /// Finish the run with a failure description
    pub fn fail(&self, error: impl Into<String>) -> TransitionResult<()> {
        self.apply(TransitionEvent::FinishError {
            error: error.into(),
            at: Utc::now(),
        })
    }

    /// Return a finished run to the default idle state
    ///
    /// Only valid from a terminal status; listeners observe the reset as a
    /// normal state transition.
    pub fn reset(&self) -> TransitionResult<()> {
        self.apply(TransitionEvent::Reset)
    }

    /// Merge a value into the executor's working memory under `key`
    ///
    /// Context writes are not lifecycle transitions, but the terminal-state
    /// contract still applies: a run in `completed`/`error` must go through
    /// `reset` before it can be written to again, so writes against a
    /// terminal state are rejected before commit and notify nothing.
    pub fn record_context(&self, key: impl Into<String>, value: ContextValue) -> TransitionResult<()> {
        let key = key.into();
        self.state.try_update(move |current| {
            if current.is_terminal() {
                return Err(TransitionError::Invalid {
                    from: current.status,
                    event: "context-write",
                });
            }
            let mut next = current.clone();
            next.context.insert(key, value);
            Ok(next)
        })
    }

    /// Drive one IR step through the effect runtime
    ///
    /// Advances to `step`, dispatches its effect, and records the outcome
    /// into the context under the step identifier. An effect failure
    /// transitions the run to `error` and surfaces the underlying fault.
    pub fn run_step<R: EffectRuntime>(
        &self,
        effects: &mut EffectAdapter<R>,
        step: &str,
        payload: &ContextValue,
    ) -> StepResult<ContextValue> {
        self.advance(step)?;
        match effects.run(step, payload) {
            Ok(outcome) => {
                self.record_context(step, outcome.clone())?;
                Ok(outcome)
            }
            Err(err) => {
                self.fail(format!("step '{step}' failed: {err}"))?;
                Err(StepError::Effect(err))
            }
        }
    }

    fn apply(&self, event: TransitionEvent) -> TransitionResult<()> {
        let name = event.name();
        self.state
            .try_update(|current| transition::apply(current, event))?;
        tracing::debug!(event = name, "execution transition committed");
        Ok(())
    }
}

impl Default for ExecutionDriver {
    fn default() -> Self {
        Self::new()
    }
}
