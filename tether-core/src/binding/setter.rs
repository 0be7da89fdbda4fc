//! Bound setters.

use std::fmt;
use std::rc::Rc;

use crate::store::{SharedStore, StoreId, Update};

/// A store's `set_state`, bound to that store.
///
/// Two setters are equal when they wrap the same type-erased handle, not
/// merely the same store. The binding adapter memoizes its setter per call
/// site and store, so a component receives an equal setter on every render
/// for as long as it stays bound to the same store. Setters handed to two
/// different components bound to one store compare unequal. Code that caches work keyed on the setter is not invalidated by
/// re-renders.
pub struct Setter<T> {
    store: SharedStore<T>,
}

impl<T> Setter<T>
where
    T: 'static,
{
    pub(crate) fn new(store: SharedStore<T>) -> Self {
        Self { store }
    }

    /// Replace the value.
    pub fn set(&self, value: T) {
        self.store.set_state(Update::Value(value));
    }

    /// Compute the next value from the current one.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T + 'static,
    {
        self.store.set_state(Update::with(f));
    }

    /// Apply an arbitrary update.
    pub fn apply(&self, update: Update<T>) {
        self.store.set_state(update);
    }

    /// Identity of the bound store.
    pub fn store_id(&self) -> StoreId {
        self.store.store_id()
    }

    pub(crate) fn store(&self) -> &SharedStore<T> {
        &self.store
    }
}

impl<T> Clone for Setter<T> {
    fn clone(&self) -> Self {
        Self {
            store: Rc::clone(&self.store),
        }
    }
}

impl<T> PartialEq for Setter<T> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.store), Rc::as_ptr(&other.store))
    }
}

impl<T> Eq for Setter<T> {}

impl<T> fmt::Debug for Setter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setter")
            .field("store", &self.store.store_id())
            .finish()
    }
}
