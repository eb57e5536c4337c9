//! Shared type aliases used across the crate
//!
//! These are compile-time conveniences only; no runtime behavior lives here.

use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::Arc;

/// Callback invoked with each committed state value (single-threaded container)
pub type Listener<T> = Rc<dyn Fn(&T)>;

/// Callback invoked with each committed state value (thread-safe container)
pub type SharedListener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Arbitrary structured value carried in execution context, results, and
/// effect payloads
pub type ContextValue = serde_json::Value;

/// The executor's mutable working memory, keyed by name
pub type Context = BTreeMap<String, ContextValue>;
