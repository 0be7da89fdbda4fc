//! Tether Core
//!
//! This crate lets components of a UI framework read and react to state that
//! lives outside the framework's own per-component state. It provides:
//!
//! - Observable stores with synchronous, ordered notification
//! - A binding adapter that turns store notifications into component renders
//! - The small set of host-framework primitives the adapter relies on, and a
//!   reference host implementing them
//!
//! # Architecture
//!
//! The crate is organized into three modules:
//!
//! - `store`: the observable container, observers and the store capability
//! - `binding`: responsiveness policies, setters and the `bind` family
//! - `host`: render triggers, effects and memos, plus the reference `Component`
//!
//! Everything is single-threaded. Scheduling belongs to the host framework;
//! this crate never spawns threads or blocks.
//!
//! # Example
//!
//! ```rust
//! use tether_core::binding::bind;
//! use tether_core::host::Component;
//! use tether_core::store::Store;
//!
//! // A store owned outside any component
//! let todos = Store::new(vec!["write docs"]);
//!
//! // A component bound to it
//! let store = todos.clone();
//! let mut list = Component::mount(move |hooks| {
//!     let (items, _set_items) = bind(hooks, &store, true);
//!     items.len()
//! });
//!
//! // Writing the store forces a render
//! todos.update(|items| {
//!     let mut items = items.clone();
//!     items.push("ship it");
//!     items
//! });
//! list.flush().unwrap();
//! assert_eq!(list.output(), Some(&2));
//! ```

pub mod binding;
mod error;
pub mod host;
pub mod store;

pub use binding::{bind, bind_any, Responsiveness, Setter};
pub use error::{Error, Result};
pub use store::{is_container, Observable, Observer, Store, Unsubscribe, Update};
