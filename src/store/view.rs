//! Read-only view over a state container
//!
//! Observer layers (UI rendering, test assertions) receive a [`StateView`]
//! instead of the full container: it exposes `get`/`snapshot`/`subscribe`
//! and nothing that mutates.

use std::fmt;
use std::rc::Rc;

use super::{StateManager, Subscription};

/// Narrow read-only handle onto a [`StateManager`]
pub struct StateView<T> {
    manager: Rc<StateManager<T>>,
}

impl<T: Clone> StateView<T> {
    /// Return the most recently committed value
    pub fn get(&self) -> T {
        self.manager.get()
    }

    /// Return the current value as a point-in-time copy
    pub fn snapshot(&self) -> T {
        self.manager.snapshot()
    }

    /// Register a listener on the underlying container
    pub fn subscribe<F>(&self, listener: F) -> Subscription<T>
    where
        F: Fn(&T) + 'static,
    {
        self.manager.subscribe(listener)
    }
}

impl<T> Clone for StateView<T> {
    fn clone(&self) -> Self {
        Self {
            manager: Rc::clone(&self.manager),
        }
    }
}

impl<T> fmt::Debug for StateView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateView").finish_non_exhaustive()
    }
}

impl<T: Clone> StateManager<T> {
    /// Produce a read-only view sharing this container
    pub fn view(self: &Rc<Self>) -> StateView<T> {
        StateView {
            manager: Rc::clone(self),
        }
    }
}
