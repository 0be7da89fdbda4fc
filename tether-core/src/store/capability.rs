//! Store capability.
//!
//! Consumers that receive stores from somewhere else (a context registry, a
//! plugin, a second copy of this crate pulled in by another dependency) should
//! not care which concrete type built them. They care that the value can be
//! read, written and observed. [`Observable`] names that capability and
//! [`is_container`] checks for it on type-erased values.

use std::any::Any;
use std::rc::Rc;

use super::container::{Store, StoreId, Update};
use super::observer::{Observer, Unsubscribe};

/// Anything that behaves like a store of `T`.
pub trait Observable<T> {
    /// Identity of the underlying store.
    fn store_id(&self) -> StoreId;

    /// Read the current value.
    fn get_state(&self) -> T;

    /// Write the value and notify observers.
    fn set_state(&self, update: Update<T>);

    /// Register an observer.
    fn subscribe(&self, observer: Observer<T>) -> Unsubscribe;

    /// Number of active registrations.
    fn observer_count(&self) -> usize;
}

/// A type-erased, shared store handle.
pub type SharedStore<T> = Rc<dyn Observable<T>>;

impl<T> Observable<T> for Store<T>
where
    T: Clone + 'static,
{
    fn store_id(&self) -> StoreId {
        self.id()
    }

    fn get_state(&self) -> T {
        Store::get_state(self)
    }

    fn set_state(&self, update: Update<T>) {
        self.dispatch(update);
    }

    fn subscribe(&self, observer: Observer<T>) -> Unsubscribe {
        self.attach(observer)
    }

    fn observer_count(&self) -> usize {
        Store::observer_count(self)
    }
}

impl<T> Store<T>
where
    T: Clone + 'static,
{
    /// Wrap this store in a type-erased handle.
    pub fn shared(&self) -> SharedStore<T> {
        Rc::new(self.clone())
    }
}

/// Check whether `value` can be used as a store of `T`.
///
/// Recognizes a [`Store<T>`] and any [`SharedStore<T>`], whatever concrete
/// type sits behind the trait object. Everything else, including stores of a
/// different value type, is rejected.
///
/// ```rust
/// use tether_core::store::{is_container, Store};
///
/// let store = Store::new(1_u32);
/// assert!(is_container::<u32>(&store));
/// assert!(is_container::<u32>(&store.shared()));
/// assert!(!is_container::<u32>(&1_u32));
/// assert!(!is_container::<String>(&store));
/// ```
pub fn is_container<T>(value: &dyn Any) -> bool
where
    T: 'static,
{
    value.is::<Store<T>>() || value.is::<SharedStore<T>>()
}
