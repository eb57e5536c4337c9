//! Adapter over an external effect-execution runtime
//!
//! The executor never talks to the effect runtime directly; it goes through
//! [`EffectAdapter`], a pass-through that adds tracing and a stable error
//! surface but no logic of its own. Runtime faults cross the boundary as
//! anyhow errors wrapped in [`EffectError::Runtime`](crate::error::EffectError).

use crate::error::EffectResult;
use crate::types::ContextValue;

/// External runtime capable of executing one IR step's effect
pub trait EffectRuntime {
    /// Execute the effect for `step` with the given payload, returning its
    /// outcome value
    fn run_effect(&mut self, step: &str, payload: &ContextValue) -> EffectResult<ContextValue>;
}

/// Thin pass-through wrapper around an [`EffectRuntime`]
#[derive(Debug)]
pub struct EffectAdapter<R> {
    runtime: R,
}

impl<R: EffectRuntime> EffectAdapter<R> {
    /// Wrap an effect runtime
    pub fn new(runtime: R) -> Self {
        Self { runtime }
    }

    /// Delegate one step to the runtime
    pub fn run(&mut self, step: &str, payload: &ContextValue) -> EffectResult<ContextValue> {
        tracing::debug!(step, "dispatching effect to runtime");
        self.runtime.run_effect(step, payload)
    }

    /// Borrow the wrapped runtime
    pub fn get_ref(&self) -> &R {
        &self.runtime
    }

    /// Unwrap the adapter, returning the runtime
    pub fn into_inner(self) -> R {
        self.runtime
    }
}
