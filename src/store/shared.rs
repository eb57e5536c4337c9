//! Thread-safe port of the state container
//!
//! `SharedStateManager<T>` carries the same contract as
//! [`StateManager`](super::StateManager) behind a single lock per container.
//! Read-modify-write happens under the lock; notification always runs
//! outside it, so a listener that re-enters the container cannot deadlock
//! the pass. Callers remain responsible for serializing logically-ordered
//! mutations onto one thread of control.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::ListenerId;
use crate::types::SharedListener;

struct SharedEntry<T> {
    id: ListenerId,
    callback: SharedListener<T>,
}

impl<T> Clone for SharedEntry<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            callback: Arc::clone(&self.callback),
        }
    }
}

type SharedRegistry<T> = Arc<Mutex<Vec<SharedEntry<T>>>>;

/// Observable box holding one value of type `T`, usable across threads
pub struct SharedStateManager<T> {
    current: Mutex<T>,
    initial: T,
    listeners: SharedRegistry<T>,
}

impl<T: Clone> SharedStateManager<T> {
    /// Create a container seeded with `initial`
    pub fn new(initial: T) -> Self {
        Self {
            current: Mutex::new(initial.clone()),
            initial,
            listeners: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Return the most recently committed value
    pub fn get(&self) -> T {
        self.current.lock().clone()
    }

    /// Return the current value as a point-in-time copy
    pub fn snapshot(&self) -> T {
        self.get()
    }

    /// Commit `next`, then notify listeners outside the lock
    pub fn set(&self, next: T) {
        {
            let mut current = self.current.lock();
            *current = next.clone();
        }
        self.notify(&next);
    }

    /// Atomically read-modify-write under the container lock, then notify
    /// outside it
    pub fn update<F>(&self, updater: F)
    where
        F: FnOnce(&T) -> T,
    {
        let next = {
            let mut current = self.current.lock();
            let next = updater(&current);
            *current = next.clone();
            next
        };
        self.notify(&next);
    }

    /// Fallible variant of [`SharedStateManager::update`]; an error leaves
    /// the value unchanged and fires no listeners
    pub fn try_update<F, E>(&self, updater: F) -> Result<(), E>
    where
        F: FnOnce(&T) -> Result<T, E>,
    {
        let next = {
            let mut current = self.current.lock();
            let next = updater(&current)?;
            *current = next.clone();
            next
        };
        self.notify(&next);
        Ok(())
    }

    /// Restore the value captured at construction, notifying as a normal
    /// commit
    pub fn reset(&self) {
        self.set(self.initial.clone());
    }

    /// Register a listener; callbacks run on whichever thread commits
    pub fn subscribe<F>(&self, listener: F) -> SharedSubscription<T>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = ListenerId::new();
        self.listeners.lock().push(SharedEntry {
            id,
            callback: Arc::new(listener),
        });
        SharedSubscription {
            id,
            registry: Arc::downgrade(&self.listeners),
            active: true,
        }
    }

    /// Number of currently-subscribed listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    fn notify(&self, committed: &T) {
        let pass: Vec<SharedEntry<T>> = self.listeners.lock().clone();
        for entry in pass {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| (entry.callback)(committed)));
            if outcome.is_err() {
                tracing::error!(
                    listener = %entry.id,
                    "listener panicked during notification pass; continuing"
                );
            }
        }
    }
}

/// Handle for removing a listener from a [`SharedStateManager`]
pub struct SharedSubscription<T> {
    id: ListenerId,
    registry: Weak<Mutex<Vec<SharedEntry<T>>>>,
    active: bool,
}

impl<T> SharedSubscription<T> {
    /// Identifier of the listener this subscription controls
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Whether the listener is still registered through this handle
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Remove the listener; repeated calls are a no-op
    pub fn unsubscribe(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().retain(|entry| entry.id != self.id);
        }
    }
}

impl<T> fmt::Debug for SharedSubscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSubscription")
            .field("id", &self.id)
            .field("active", &self.active)
            .finish()
    }
}
