//! Host Framework Integration
//!
//! The binding adapter needs three things from the component framework it
//! runs in: a way to force a component to render, effects tied to the
//! component's lifecycle, and memoization keyed by identity. This module
//! defines those as traits ([`Host`], [`RenderTrigger`], [`Cleanup`]) and
//! ships a small reference host ([`Component`]) that implements them.
//!
//! # The reference host
//!
//! `Component` is deliberately small: positional hook slots, a render token
//! and dirty flag, effects committed after each render, and a `flush` loop
//! that keeps rendering while renders are being forced. It exists so the
//! adapter can be exercised without a full UI framework, and as a worked
//! example for integrators implementing `Host` themselves.

mod component;
mod context;
mod effect;
mod memo;
mod traits;

pub use component::{Component, ComponentId, Hooks, Trigger, MAX_FLUSH_PASSES};
pub use context::RenderContext;
pub use traits::{Cleanup, Host, RenderTrigger};
