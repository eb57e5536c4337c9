//! Integration tests for the generic observable state container.

use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use cadence::StateManager;
use proptest::prelude::*;

type Log = Rc<RefCell<Vec<String>>>;

fn logger(log: &Log, tag: &str) -> impl Fn(&i64) + 'static {
    let log = Rc::clone(log);
    let tag = tag.to_string();
    move |value: &i64| log.borrow_mut().push(format!("{tag}:{value}"))
}

#[test]
fn set_then_get_and_snapshot_agree() {
    let manager = StateManager::new(0_i64);
    for value in [3, -8, 12] {
        manager.set(value);
        assert_eq!(manager.get(), value);
        assert_eq!(manager.snapshot(), value);
    }
}

#[test]
fn listeners_fire_in_subscription_order_exactly_once() {
    let manager = StateManager::new(0_i64);
    let log: Log = Rc::new(RefCell::new(Vec::new()));

    let _a = manager.subscribe(logger(&log, "a"));
    let _b = manager.subscribe(logger(&log, "b"));
    let _c = manager.subscribe(logger(&log, "c"));

    manager.set(1);
    assert_eq!(*log.borrow(), vec!["a:1", "b:1", "c:1"]);

    manager.set(2);
    assert_eq!(
        *log.borrow(),
        vec!["a:1", "b:1", "c:1", "a:2", "b:2", "c:2"]
    );
}

#[test]
fn unsubscribe_stops_future_delivery_and_twice_is_noop() {
    let manager = StateManager::new(0_i64);
    let log: Log = Rc::new(RefCell::new(Vec::new()));

    let mut a = manager.subscribe(logger(&log, "a"));
    let _b = manager.subscribe(logger(&log, "b"));

    manager.set(1);
    a.unsubscribe();
    a.unsubscribe();
    manager.set(2);

    assert_eq!(*log.borrow(), vec!["a:1", "b:1", "b:2"]);
}

#[test]
fn listener_subscribed_during_pass_misses_that_pass() {
    let manager = Rc::new(StateManager::new(0_i64));
    let log: Log = Rc::new(RefCell::new(Vec::new()));

    let manager_in_listener = Rc::clone(&manager);
    let log_in_listener = Rc::clone(&log);
    let late_log = Rc::clone(&log);
    let registered = Rc::new(RefCell::new(Vec::new()));
    let registered_in_listener = Rc::clone(&registered);
    let _a = manager.subscribe(move |value: &i64| {
        log_in_listener.borrow_mut().push(format!("a:{value}"));
        let late = Rc::clone(&late_log);
        let subscription = manager_in_listener
            .subscribe(move |value: &i64| late.borrow_mut().push(format!("late:{value}")));
        registered_in_listener.borrow_mut().push(subscription);
    });

    manager.set(1);
    // The listener registered mid-pass joins future passes only
    assert_eq!(*log.borrow(), vec!["a:1"]);

    manager.set(2);
    assert_eq!(*log.borrow(), vec!["a:1", "a:2", "late:2"]);
}

#[test]
fn unsubscribe_during_pass_does_not_affect_in_flight_pass() {
    let manager = StateManager::new(0_i64);
    let log: Log = Rc::new(RefCell::new(Vec::new()));

    let b_slot: Rc<RefCell<Option<cadence::Subscription<i64>>>> = Rc::new(RefCell::new(None));
    let b_in_listener = Rc::clone(&b_slot);
    let log_in_a = Rc::clone(&log);
    let _a = manager.subscribe(move |value: &i64| {
        log_in_a.borrow_mut().push(format!("a:{value}"));
        if let Some(subscription) = b_in_listener.borrow_mut().as_mut() {
            subscription.unsubscribe();
        }
    });
    *b_slot.borrow_mut() = Some(manager.subscribe(logger(&log, "b")));

    manager.set(1);
    // The pass snapshot was taken before `a` removed `b`
    assert_eq!(*log.borrow(), vec!["a:1", "b:1"]);

    manager.set(2);
    assert_eq!(*log.borrow(), vec!["a:1", "b:1", "a:2"]);
}

#[test]
fn reset_restores_initial_and_notifies_once() {
    let manager = StateManager::new(5_i64);
    manager.set(99);
    manager.update(|n| n * 2);

    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let _a = manager.subscribe(logger(&log, "a"));

    manager.reset();
    assert_eq!(manager.get(), 5);
    assert_eq!(*log.borrow(), vec!["a:5"]);
}

#[test]
fn failing_updater_commits_nothing_and_fires_no_listeners() {
    let manager = StateManager::new(10_i64);
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let _a = manager.subscribe(logger(&log, "a"));

    let result: Result<(), &str> = manager.try_update(|_| Err("bad"));
    assert_eq!(result, Err("bad"));
    assert_eq!(manager.get(), 10);
    assert!(log.borrow().is_empty());
}

#[test]
fn panicking_updater_commits_nothing_and_fires_no_listeners() {
    let manager = StateManager::new(10_i64);
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let _a = manager.subscribe(logger(&log, "a"));

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        manager.update(|_| panic!("updater fault"));
    }));
    assert!(outcome.is_err());
    assert_eq!(manager.get(), 10);
    assert!(log.borrow().is_empty());
}

#[test]
fn panicking_listener_does_not_block_siblings_or_roll_back() {
    let manager = StateManager::new(0_i64);
    let log: Log = Rc::new(RefCell::new(Vec::new()));

    let _first = manager.subscribe(|_: &i64| panic!("listener fault"));
    let _second = manager.subscribe(logger(&log, "second"));

    manager.set(7);

    assert_eq!(*log.borrow(), vec!["second:7"]);
    assert_eq!(manager.get(), 7);
}

proptest! {
    #[test]
    fn prop_last_commit_wins(values in prop::collection::vec(any::<i64>(), 1..16)) {
        let manager = StateManager::new(0_i64);
        for value in &values {
            manager.set(*value);
        }
        prop_assert_eq!(manager.get(), *values.last().unwrap());
    }

    #[test]
    fn prop_update_equals_function_of_previous(seed in any::<i64>(), delta in any::<i64>()) {
        let manager = StateManager::new(seed);
        manager.update(|n| n.wrapping_add(delta));
        prop_assert_eq!(manager.get(), seed.wrapping_add(delta));
    }
}
