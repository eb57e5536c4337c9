//! Generic observable state container
//!
//! `StateManager<T>` owns a single value, notifies subscribed listeners on
//! every committed change, and can reset to the value captured at
//! construction. Commits are atomic: an updater that fails (error return or
//! panic) leaves the current value untouched and fires no listeners.
//!
//! Notification snapshots the listener list before iterating, so subscribing
//! or unsubscribing from inside a listener never affects the pass already in
//! progress.
//!
//! Listener-fault policy: a listener that panics during notification is
//! caught, reported via `tracing::error!`, and skipped; subsequent listeners
//! in the same pass still run, and the committed value is never rolled back.
//!
//! The container is single-threaded by design; see [`shared`] for the
//! lock-per-container port used from multi-threaded hosts.

use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Listener;

pub mod shared;
pub mod view;

/// Unique identifier for a registered listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListenerId(pub Uuid);

impl ListenerId {
    /// Create a new random ListenerId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One registered listener, in subscription order
struct ListenerEntry<T> {
    id: ListenerId,
    callback: Listener<T>,
}

impl<T> Clone for ListenerEntry<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            callback: Rc::clone(&self.callback),
        }
    }
}

type Registry<T> = Rc<RefCell<Vec<ListenerEntry<T>>>>;

/// Observable box holding one value of type `T`
///
/// All operations take `&self`; interior mutability keeps the container
/// usable behind shared handles such as [`view::StateView`].
pub struct StateManager<T> {
    current: RefCell<T>,
    initial: T,
    listeners: Registry<T>,
}

impl<T: Clone> StateManager<T> {
    /// Create a container seeded with `initial`; the seed is also retained
    /// for [`StateManager::reset`]
    pub fn new(initial: T) -> Self {
        Self {
            current: RefCell::new(initial.clone()),
            initial,
            listeners: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Return the most recently committed value
    pub fn get(&self) -> T {
        self.current.borrow().clone()
    }

    /// Return the current value as a point-in-time copy
    ///
    /// Same accessor path as [`StateManager::get`]; distinguished only to
    /// signal intent at call sites that capture a value before further
    /// mutation.
    pub fn snapshot(&self) -> T {
        self.get()
    }

    /// Commit `next` and notify every currently-subscribed listener, in
    /// subscription order, with the committed value
    pub fn set(&self, next: T) {
        *self.current.borrow_mut() = next.clone();
        self.notify(&next);
    }

    /// Compute `updater(current)` and commit the result as [`StateManager::set`]
    ///
    /// The updater must be a pure function of the current value. If it
    /// panics, nothing has been committed and no listeners fire.
    pub fn update<F>(&self, updater: F)
    where
        F: FnOnce(&T) -> T,
    {
        let next = {
            let current = self.current.borrow();
            updater(&current)
        };
        self.set(next);
    }

    /// Fallible variant of [`StateManager::update`]
    ///
    /// If the updater returns an error the current value is left unchanged,
    /// no listeners fire, and the error propagates to the caller.
    pub fn try_update<F, E>(&self, updater: F) -> Result<(), E>
    where
        F: FnOnce(&T) -> Result<T, E>,
    {
        let next = {
            let current = self.current.borrow();
            updater(&current)?
        };
        self.set(next);
        Ok(())
    }

    /// Restore the value captured at construction and notify exactly as
    /// [`StateManager::set`] would
    pub fn reset(&self) {
        self.set(self.initial.clone());
    }

    /// Register a listener; it is invoked for every commit after this call
    ///
    /// A listener subscribed from inside another listener joins future
    /// passes only, never the pass in progress.
    pub fn subscribe<F>(&self, listener: F) -> Subscription<T>
    where
        F: Fn(&T) + 'static,
    {
        let id = ListenerId::new();
        self.listeners.borrow_mut().push(ListenerEntry {
            id,
            callback: Rc::new(listener),
        });
        Subscription {
            id,
            registry: Rc::downgrade(&self.listeners),
            active: true,
        }
    }

    /// Number of currently-subscribed listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Run one notification pass over a snapshot of the listener list
    fn notify(&self, committed: &T) {
        let pass: Vec<ListenerEntry<T>> = self.listeners.borrow().clone();
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

/// Handle for removing a listener registered with [`StateManager::subscribe`]
///
/// Holds only a weak reference to the listener registry, so it may safely
/// outlive the container. Unsubscribing twice is a no-op, as is
/// unsubscribing after the container has been dropped.
pub struct Subscription<T> {
    id: ListenerId,
    registry: Weak<RefCell<Vec<ListenerEntry<T>>>>,
    active: bool,
}

impl<T> Subscription<T> {
    /// Identifier of the listener this subscription controls
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Whether the listener is still registered through this handle
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Remove exactly the listener registered by the originating
    /// `subscribe` call
    ///
    /// Removal does not affect a notification pass already in progress;
    /// the listener simply misses all future passes.
    pub fn unsubscribe(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().retain(|entry| entry.id != self.id);
        }
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.active)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_returns_seed() {
        let manager = StateManager::new(7_i64);
        assert_eq!(manager.get(), 7);
        assert_eq!(manager.snapshot(), 7);
    }

    #[test]
    fn test_set_commits_and_get_follows() {
        let manager = StateManager::new(0_i64);
        manager.set(41);
        manager.set(42);
        assert_eq!(manager.get(), 42);
        assert_eq!(manager.snapshot(), 42);
    }

    #[test]
    fn test_update_applies_updater_to_current() {
        let manager = StateManager::new(10_i64);
        manager.update(|n| n + 5);
        assert_eq!(manager.get(), 15);
    }

    #[test]
    fn test_try_update_error_leaves_value_unchanged() {
        let manager = StateManager::new(10_i64);
        let result: Result<(), &str> = manager.try_update(|_| Err("nope"));
        assert_eq!(result, Err("nope"));
        assert_eq!(manager.get(), 10);
    }

    #[test]
    fn test_reset_restores_seed() {
        let manager = StateManager::new(1_i64);
        manager.set(2);
        manager.update(|n| n * 10);
        manager.reset();
        assert_eq!(manager.get(), 1);
    }

    #[test]
    fn test_subscribe_and_unsubscribe_adjust_listener_count() {
        let manager = StateManager::new(0_i64);
        let mut first = manager.subscribe(|_| {});
        let _second = manager.subscribe(|_| {});
        assert_eq!(manager.listener_count(), 2);

        first.unsubscribe();
        assert_eq!(manager.listener_count(), 1);
        assert!(!first.is_active());

        // Second unsubscribe is a no-op
        first.unsubscribe();
        assert_eq!(manager.listener_count(), 1);
    }

    #[test]
    fn test_unsubscribe_after_container_dropped_is_noop() {
        let manager = StateManager::new(0_i64);
        let mut subscription = manager.subscribe(|_| {});
        drop(manager);
        subscription.unsubscribe();
        assert!(!subscription.is_active());
    }
}
