//! Store Bindings
//!
//! This module connects stores to components. A component calls [`bind`]
//! during render; it gets back the store's current value and a setter, and
//! from then on writes to the store force the component to render again.
//!
//! # Concepts
//!
//! ## Responsiveness
//!
//! [`Responsiveness`] decides which writes force a render: all of them
//! (`Always`, the default for `true`), none (`Never`, for `false`), or those
//! accepted by a predicate over `(next, prev)`.
//!
//! ## Setters
//!
//! [`Setter`] is the store's write operation bound to that store. It is
//! memoized per store, so it compares equal across renders.
//!
//! ## Association
//!
//! Each `bind` call site keeps an association with its store: a subscription
//! managed through a host effect keyed by `(store, responsiveness)`. See
//! [`AssociationState`] for the lifecycle.

mod adapter;
mod responsiveness;
mod setter;

pub use adapter::{
    bind, bind_any, bind_shared, bind_with_probe, Association, AssociationState, BindingKey,
};
pub use responsiveness::{Responsiveness, ResponsivenessKey};
pub use setter::Setter;
