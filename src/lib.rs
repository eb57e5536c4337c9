//! Cadence – Observable state container for a step-wise IR executor
//!
//! This crate implements the execution-state core shared by the executor and
//! its observers:
//! - A generic `StateManager<T>` with atomic updates, ordered listener
//!   notification, snapshots, and reset-to-initial
//! - The `ExecutionState` model that an IR executor drives through its
//!   idle/running/paused/completed/error lifecycle
//! - A transition table with guard checking, plus a validating driver that
//!   rejects off-table transitions before they are committed
//! - A thin adapter over an external effect-execution runtime
//!
//! The container itself is transition-agnostic: lifecycle discipline is
//! enforced by [`ExecutionDriver`], never by `StateManager`.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Adapter over an external effect-execution runtime
pub mod effect;
/// Error types shared across the crate
pub mod error;
/// Execution-state model, transition table, and validating driver
pub mod exec;
/// Generic observable state containers
pub mod store;
/// Shared type aliases with no runtime behavior
pub mod types;

// Re-export key types for convenience
pub use exec::driver::ExecutionDriver;
pub use exec::{ExecutionMetadata, ExecutionState, ExecutionStatus};
pub use store::view::StateView;
pub use store::{ListenerId, StateManager, Subscription};

/// Current version of the cadence crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
