//! Store Implementation
//!
//! A Store is an observable container for a single value. It owns the value
//! and an ordered list of observers, and notifies every observer
//! synchronously each time the value is written.
//!
//! # How Stores Work
//!
//! 1. `set_state` takes a snapshot of the observer list the moment it starts.
//!
//! 2. The next value is resolved (directly, or by calling an updater with the
//!    current value), the previous value is swapped out and the next one
//!    stored.
//!
//! 3. Each observer in the snapshot is called with `(next, prev)`, in
//!    registration order.
//!
//! Notification is unconditional: writing a value equal to the current one
//! still notifies. The value type never needs `PartialEq`.
//!
//! # Reentrancy
//!
//! No borrow of the store is held while observers run. An observer may read
//! the store, write it again (which runs a nested notification round to
//! completion before the outer round resumes), subscribe new observers, or
//! unsubscribe existing ones. Observers added during a round are not called
//! in that round, and neither are observers an updater subscribes; observers
//! removed during a round are still called in it, including an observer that
//! unsubscribes itself.
//! An observer that writes the store on every notification recurses without
//! bound; the store does not guard against that.
//!
//! # Failure
//!
//! A panicking observer unwinds straight out of `set_state`. Observers later
//! in the snapshot are not called. The store itself is left consistent: the
//! new value is already in place and nothing is poisoned.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use smallvec::SmallVec;
use tracing::trace;

use super::observer::{Observer, Unsubscribe};

/// Counter for generating unique store IDs.
static STORE_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Process-unique identity of a store.
///
/// Every clone of a [`Store`] reports the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreId(u64);

impl StoreId {
    /// Allocate a fresh id.
    ///
    /// `Store::new` does this itself; other [`Observable`](super::Observable)
    /// implementations call it once at construction.
    pub fn new() -> Self {
        Self(STORE_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for StoreId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "store#{}", self.0)
    }
}

/// A write to a store: either a replacement value or an updater.
pub enum Update<T> {
    /// Replace the value.
    Value(T),
    /// Compute the next value from the current one.
    With(Box<dyn FnOnce(&T) -> T>),
}

impl<T> Update<T> {
    /// Build an updater.
    pub fn with<F>(f: F) -> Self
    where
        F: FnOnce(&T) -> T + 'static,
    {
        Update::With(Box::new(f))
    }

    fn resolve(self, current: &T) -> T {
        match self {
            Update::Value(value) => value,
            Update::With(f) => f(current),
        }
    }
}

impl<T> From<T> for Update<T> {
    fn from(value: T) -> Self {
        Update::Value(value)
    }
}

impl<T> fmt::Debug for Update<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Update::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Update::With(_) => f.write_str("With(..)"),
        }
    }
}

/// An observable container holding a value of type `T`.
///
/// `Store` is a handle: cloning it is cheap and every clone refers to the
/// same value and observer list. The store lives as long as its longest
/// holder.
///
/// # Example
///
/// ```rust
/// use tether_core::store::Store;
///
/// let count = Store::new(0);
///
/// let unsubscribe = count.subscribe(|next: &i32, prev: &i32| {
///     println!("count: {prev} -> {next}");
/// });
///
/// count.set_state(5);
/// count.update(|v| v + 1);
/// assert_eq!(count.get_state(), 6);
///
/// unsubscribe.unsubscribe();
/// ```
pub struct Store<T> {
    inner: Rc<StoreInner<T>>,
}

struct StoreInner<T> {
    /// Unique identifier for this store.
    id: StoreId,

    /// The current value. Replaced wholesale on every write.
    state: RefCell<Rc<T>>,

    /// Registered observers, in notification order. May hold the same
    /// observer more than once.
    observers: RefCell<Vec<Observer<T>>>,
}

impl<T> Store<T>
where
    T: 'static,
{
    /// Create a new store with the given initial value.
    pub fn new(initial: T) -> Self {
        let id = StoreId::new();
        trace!(store = %id, "store created");

        Self {
            inner: Rc::new(StoreInner {
                id,
                state: RefCell::new(Rc::new(initial)),
                observers: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Get the store's unique ID.
    pub fn id(&self) -> StoreId {
        self.inner.id
    }

    /// Whether both handles refer to the same store.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Get a clone of the current value.
    pub fn get_state(&self) -> T
    where
        T: Clone,
    {
        T::clone(&self.inner.state.borrow())
    }

    /// Get the current value without cloning it.
    ///
    /// The returned `Rc` is detached from the store: later writes replace
    /// the store's value but leave this snapshot untouched.
    pub fn snapshot(&self) -> Rc<T> {
        Rc::clone(&self.inner.state.borrow())
    }

    /// Write the store and notify every observer.
    ///
    /// Accepts a plain value or an [`Update`]:
    ///
    /// ```rust
    /// use tether_core::store::{Store, Update};
    ///
    /// let store = Store::new(2);
    /// store.set_state(10);
    /// store.set_state(Update::with(|v: &i32| v * 3));
    /// assert_eq!(store.get_state(), 30);
    /// ```
    pub fn set_state(&self, update: impl Into<Update<T>>) {
        self.dispatch(update.into());
    }

    /// Write the store with a value computed from the current one.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T + 'static,
    {
        self.dispatch(Update::with(f));
    }

    /// Register an observer.
    ///
    /// The returned handle detaches **every** registration of this observer,
    /// not just the one made by this call: if the same observer (or a clone
    /// of it) was subscribed twice, either handle removes both entries.
    /// Existing callers depend on that, so it is kept as part of the
    /// contract even though it may have started as an accident of the
    /// removal loop.
    pub fn subscribe(&self, observer: impl Into<Observer<T>>) -> Unsubscribe {
        self.attach(observer.into())
    }

    /// Number of active registrations, duplicates included.
    pub fn observer_count(&self) -> usize {
        self.inner.observers.borrow().len()
    }

    pub(crate) fn dispatch(&self, update: Update<T>) {
        // Taken before the updater runs: registrations made by the updater or
        // by observers belong to the next round.
        let observers: SmallVec<[Observer<T>; 4]> =
            self.inner.observers.borrow().iter().cloned().collect();

        let current = self.snapshot();
        let next = Rc::new(update.resolve(&current));
        drop(current);

        let prev = self.inner.state.replace(Rc::clone(&next));

        trace!(
            store = %self.inner.id,
            observers = observers.len(),
            "notifying observers"
        );

        for observer in &observers {
            observer.notify(&next, &prev);
        }
    }

    pub(crate) fn attach(&self, observer: Observer<T>) -> Unsubscribe {
        let mut observers = self.inner.observers.borrow_mut();
        observers.push(observer.clone());
        trace!(store = %self.inner.id, observers = observers.len(), "observer subscribed");
        drop(observers);

        let inner = Rc::downgrade(&self.inner);
        Unsubscribe::new(move || {
            // A store that is already gone has nothing left to detach.
            let Some(inner) = inner.upgrade() else {
                return;
            };

            let mut observers = inner.observers.borrow_mut();
            let before = observers.len();
            observers.retain(|registered| !registered.ptr_eq(&observer));
            trace!(
                store = %inner.id,
                removed = before - observers.len(),
                observers = observers.len(),
                "observer unsubscribed"
            );
        })
    }
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Store<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("id", &self.inner.id)
            .field("state", &self.inner.state.borrow())
            .field("observer_count", &self.inner.observers.borrow().len())
            .finish()
    }
}

impl<T> Default for Store<T>
where
    T: Default + 'static,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[test]
    fn store_get_and_set() {
        let store = Store::new(0);
        assert_eq!(store.get_state(), 0);

        store.set_state(42);
        assert_eq!(store.get_state(), 42);
    }

    #[test]
    fn store_update_uses_current_value() {
        let store = Store::new(10);
        store.update(|v| v + 5);
        assert_eq!(store.get_state(), 15);

        store.set_state(Update::with(|v: &i32| v * 2));
        assert_eq!(store.get_state(), 30);
    }

    #[test]
    fn observers_receive_next_and_prev() {
        let store = Store::new(String::from("a"));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();

        let _unsubscribe = store.subscribe(move |next: &String, prev: &String| {
            seen_clone.borrow_mut().push((next.clone(), prev.clone()));
        });

        store.set_state(String::from("b"));
        store.update(|v| format!("{v}c"));

        assert_eq!(
            *seen.borrow(),
            vec![
                (String::from("b"), String::from("a")),
                (String::from("bc"), String::from("b")),
            ]
        );
    }

    #[test]
    fn notification_is_unconditional() {
        let store = Store::new(1);
        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();

        let _unsubscribe = store.subscribe(move |_: &i32, _: &i32| {
            calls_clone.set(calls_clone.get() + 1);
        });

        store.set_state(1);
        store.set_state(1);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn observers_run_in_registration_order() {
        let store = Store::new(0);
        let order = Rc::new(RefCell::new(Vec::new()));

        let _handles: Vec<_> = (0..4)
            .map(|i| {
                let order = order.clone();
                store.subscribe(move |_: &i32, _: &i32| order.borrow_mut().push(i))
            })
            .collect();

        store.set_state(1);
        assert_eq!(*order.borrow(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn unsubscribe_removes_every_duplicate() {
        let store = Store::new(0);
        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();

        let observer = Observer::new(move |_: &i32, _: &i32| {
            calls_clone.set(calls_clone.get() + 1);
        });

        let first = store.subscribe(observer.clone());
        let _second = store.subscribe(observer);
        assert_eq!(store.observer_count(), 2);

        store.set_state(1);
        assert_eq!(calls.get(), 2);

        first.unsubscribe();
        assert_eq!(store.observer_count(), 0);

        store.set_state(2);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn unsubscribe_leaves_other_observers() {
        let store = Store::new(0);
        let a = store.subscribe(|_: &i32, _: &i32| {});
        let _b = store.subscribe(|_: &i32, _: &i32| {});

        a.unsubscribe();
        a.unsubscribe();
        assert_eq!(store.observer_count(), 1);
    }

    #[test]
    fn observer_added_during_round_waits_for_next_round() {
        let store = Store::new(0);
        let late_calls = Rc::new(Cell::new(0));

        let store_clone = store.clone();
        let late_calls_clone = late_calls.clone();
        let added = Rc::new(Cell::new(false));
        let _unsubscribe = store.subscribe(move |_: &i32, _: &i32| {
            if !added.replace(true) {
                let late_calls = late_calls_clone.clone();
                let _ = store_clone.subscribe(move |_: &i32, _: &i32| {
                    late_calls.set(late_calls.get() + 1);
                });
            }
        });

        store.set_state(1);
        assert_eq!(late_calls.get(), 0);

        store.set_state(2);
        assert_eq!(late_calls.get(), 1);
    }

    #[test]
    fn observer_removed_during_round_still_runs_in_that_round() {
        let store = Store::new(0);
        let second_calls = Rc::new(Cell::new(0));

        let second_handle: Rc<RefCell<Option<Unsubscribe>>> = Rc::new(RefCell::new(None));
        let second_handle_clone = second_handle.clone();
        let _first = store.subscribe(move |_: &i32, _: &i32| {
            if let Some(handle) = second_handle_clone.borrow().as_ref() {
                handle.unsubscribe();
            }
        });

        let second_calls_clone = second_calls.clone();
        let handle = store.subscribe(move |_: &i32, _: &i32| {
            second_calls_clone.set(second_calls_clone.get() + 1);
        });
        *second_handle.borrow_mut() = Some(handle);

        store.set_state(1);
        assert_eq!(second_calls.get(), 1);
        assert_eq!(store.observer_count(), 1);

        store.set_state(2);
        assert_eq!(second_calls.get(), 1);
    }

    #[test]
    fn observer_unsubscribing_itself_finishes_the_round() {
        let store = Store::new(0);
        let log = Rc::new(RefCell::new(Vec::new()));

        let own_handle: Rc<RefCell<Option<Unsubscribe>>> = Rc::new(RefCell::new(None));
        let own_handle_clone = own_handle.clone();
        let log_clone = log.clone();
        let handle = store.subscribe(move |next: &i32, _: &i32| {
            if let Some(handle) = own_handle_clone.borrow().as_ref() {
                handle.unsubscribe();
            }
            log_clone.borrow_mut().push(format!("once {next}"));
        });
        *own_handle.borrow_mut() = Some(handle);

        let log_clone = log.clone();
        let _later = store.subscribe(move |next: &i32, _: &i32| {
            log_clone.borrow_mut().push(format!("later {next}"));
        });

        store.set_state(1);
        assert_eq!(*log.borrow(), vec!["once 1", "later 1"]);
        assert_eq!(store.observer_count(), 1);

        store.set_state(2);
        assert_eq!(*log.borrow(), vec!["once 1", "later 1", "later 2"]);
    }

    #[test]
    fn observer_subscribed_by_updater_waits_for_next_write() {
        let store = Store::new(0);
        let late_calls = Rc::new(Cell::new(0));

        let store_clone = store.clone();
        let late_calls_clone = late_calls.clone();
        store.update(move |value| {
            let late_calls = late_calls_clone.clone();
            let _ = store_clone.subscribe(move |_: &i32, _: &i32| {
                late_calls.set(late_calls.get() + 1);
            });
            value + 1
        });

        assert_eq!(store.get_state(), 1);
        assert_eq!(store.observer_count(), 1);
        assert_eq!(late_calls.get(), 0);

        store.set_state(2);
        assert_eq!(late_calls.get(), 1);
    }

    #[test]
    fn nested_write_completes_before_outer_round_resumes() {
        let store = Store::new(0);
        let log = Rc::new(RefCell::new(Vec::new()));

        let store_clone = store.clone();
        let log_clone = log.clone();
        let _first = store.subscribe(move |next: &i32, prev: &i32| {
            log_clone.borrow_mut().push(format!("first {prev}->{next}"));
            if *next == 1 {
                store_clone.set_state(2);
            }
        });

        let log_clone = log.clone();
        let _second = store.subscribe(move |next: &i32, prev: &i32| {
            log_clone.borrow_mut().push(format!("second {prev}->{next}"));
        });

        store.set_state(1);

        assert_eq!(store.get_state(), 2);
        assert_eq!(
            *log.borrow(),
            vec![
                "first 0->1",
                "first 1->2",
                "second 1->2",
                "second 0->1",
            ]
        );
    }

    #[test]
    fn panicking_observer_aborts_the_round() {
        let store = Store::new(0);
        let after_calls = Rc::new(Cell::new(0));

        let _panics = store.subscribe(|next: &i32, _: &i32| {
            if *next == 1 {
                panic!("observer failure");
            }
        });
        let after_calls_clone = after_calls.clone();
        let _after = store.subscribe(move |_: &i32, _: &i32| {
            after_calls_clone.set(after_calls_clone.get() + 1);
        });

        let result = catch_unwind(AssertUnwindSafe(|| store.set_state(1)));
        assert!(result.is_err());
        assert_eq!(after_calls.get(), 0);

        // Value was written before notification, and the store still works.
        assert_eq!(store.get_state(), 1);
        store.set_state(2);
        assert_eq!(after_calls.get(), 1);
    }

    #[test]
    fn unsubscribe_after_store_dropped_is_noop() {
        let store = Store::new(0);
        let handle = store.subscribe(|_: &i32, _: &i32| {});
        drop(store);

        handle.unsubscribe();
        assert!(handle.is_spent());
    }

    #[test]
    fn snapshot_is_detached_from_later_writes() {
        let store = Store::new(vec![1, 2]);
        let before = store.snapshot();

        store.update(|v| v.iter().map(|x| x * 10).collect());

        assert_eq!(*before, vec![1, 2]);
        assert_eq!(store.get_state(), vec![10, 20]);
    }

    #[test]
    fn store_clone_shares_state() {
        let store1 = Store::new(0);
        let store2 = store1.clone();

        store1.set_state(42);
        assert_eq!(store2.get_state(), 42);
        assert!(store1.ptr_eq(&store2));
        assert_eq!(store1.id(), store2.id());
    }

    #[test]
    fn store_ids_are_unique() {
        let s1 = Store::new(0);
        let s2 = Store::new(0);
        let s3 = Store::new(0);

        assert_ne!(s1.id(), s2.id());
        assert_ne!(s2.id(), s3.id());
        assert_ne!(s1.id(), s3.id());
        assert!(!s1.ptr_eq(&s2));
    }
}
