//! Observer types for stores.
//!
//! An Observer is a callback invoked with `(next, prev)` every time a store
//! is written. Observers are compared by identity, not by behavior: two
//! clones of the same `Observer` are the same registration target, while two
//! observers built from identical closures are not.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A callback notified with the next and previous value of a store.
///
/// # Example
///
/// ```rust
/// use tether_core::store::{Observer, Store};
///
/// let store = Store::new(1);
/// let log = Observer::new(|next: &i32, prev: &i32| println!("{prev} -> {next}"));
///
/// let unsubscribe = store.subscribe(log.clone());
/// store.set_state(2);
/// unsubscribe.unsubscribe();
/// ```
pub struct Observer<T> {
    callback: Rc<dyn Fn(&T, &T)>,
}

impl<T> Observer<T> {
    /// Wrap a callback taking `(next, prev)`.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&T, &T) + 'static,
    {
        Self {
            callback: Rc::new(callback),
        }
    }

    /// Invoke the callback.
    pub fn notify(&self, next: &T, prev: &T) {
        (self.callback)(next, prev);
    }

    /// Whether both handles point at the same callback allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.callback), Rc::as_ptr(&other.callback))
    }
}

impl<T> Clone for Observer<T> {
    fn clone(&self) -> Self {
        Self {
            callback: Rc::clone(&self.callback),
        }
    }
}

impl<T, F> From<F> for Observer<T>
where
    F: Fn(&T, &T) + 'static,
{
    fn from(callback: F) -> Self {
        Self::new(callback)
    }
}

impl<T> fmt::Debug for Observer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("ptr", &Rc::as_ptr(&self.callback).cast::<()>())
            .finish()
    }
}

/// Detaches an observer from the store it was registered with.
///
/// Returned by `subscribe`. The detach action runs at most once: the first
/// call to [`Unsubscribe::unsubscribe`] removes the observer, every later call
/// (on this handle or any clone of it) does nothing. Dropping the handle does
/// not detach anything; use [`Unsubscribe::into_guard`] for that.
#[derive(Clone)]
pub struct Unsubscribe {
    detach: Rc<RefCell<Option<Box<dyn FnOnce()>>>>,
}

impl Unsubscribe {
    pub(crate) fn new<F>(detach: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self {
            detach: Rc::new(RefCell::new(Some(Box::new(detach)))),
        }
    }

    /// A handle that detaches nothing.
    pub fn noop() -> Self {
        Self {
            detach: Rc::new(RefCell::new(None)),
        }
    }

    /// Detach the observer. No-op after the first call.
    pub fn unsubscribe(&self) {
        // Take first so the detach closure runs without the cell borrowed.
        let detach = self.detach.borrow_mut().take();
        if let Some(detach) = detach {
            detach();
        }
    }

    /// Whether this handle has already run (or was a no-op from the start).
    pub fn is_spent(&self) -> bool {
        self.detach.borrow().is_none()
    }

    /// Convert into a guard that detaches when dropped.
    pub fn into_guard(self) -> SubscriptionGuard {
        SubscriptionGuard { handle: Some(self) }
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe")
            .field("spent", &self.is_spent())
            .finish()
    }
}

/// Guard that unsubscribes when dropped.
#[derive(Debug)]
pub struct SubscriptionGuard {
    handle: Option<Unsubscribe>,
}

impl SubscriptionGuard {
    /// Give back the underlying handle without detaching.
    pub fn release(mut self) -> Unsubscribe {
        self.handle.take().unwrap_or_else(Unsubscribe::noop)
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.unsubscribe();
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
