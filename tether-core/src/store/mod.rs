//! Observable Stores
//!
//! This module implements the observable container at the bottom of the
//! crate. Nothing here knows about components or rendering.
//!
//! # Concepts
//!
//! ## Stores
//!
//! A [`Store`] holds one value and a list of observers. Every write replaces
//! the value and calls each observer with `(next, prev)`, synchronously and in
//! registration order.
//!
//! ## Observers
//!
//! An [`Observer`] is a reference-counted callback. Subscribing returns an
//! [`Unsubscribe`] handle; running it removes every registration of that
//! observer.
//!
//! ## Capability
//!
//! [`Observable`] abstracts over "something that behaves like a store", and
//! [`is_container`] checks a type-erased value for that capability. The
//! binding layer relies on it to validate stores handed over by code it does
//! not control.
//!
//! # Threading
//!
//! Stores are single-threaded (`Rc` + `RefCell`). All scheduling belongs to
//! the host framework driving them.

mod capability;
mod container;
mod observer;

pub use capability::{is_container, Observable, SharedStore};
pub use container::{Store, StoreId, Update};
pub use observer::{Observer, SubscriptionGuard, Unsubscribe};
