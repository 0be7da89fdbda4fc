//! Host framework primitives.
//!
//! The binding adapter does not schedule renders or run effects itself. It
//! asks the host framework for three primitives, expressed here as traits:
//!
//! - a render trigger, which marks a component for re-rendering;
//! - a lifecycle-scoped effect, set up after commit whenever its key changes
//!   and cleaned up before the next run or on unmount;
//! - a keyed memo, which returns a cached value until its key changes.
//!
//! Any component framework can drive the adapter by implementing [`Host`] for
//! whatever object its render functions receive.

use std::fmt;

/// Forces the host to re-evaluate one component.
pub trait RenderTrigger {
    /// Advance the component's render token and schedule a render.
    fn force_render(&self);
}

/// Teardown returned by an effect setup. Runs at most once.
pub struct Cleanup {
    run: Option<Box<dyn FnOnce()>>,
}

impl Cleanup {
    /// Wrap a teardown closure.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self {
            run: Some(Box::new(f)),
        }
    }

    /// A cleanup that does nothing.
    pub fn none() -> Self {
        Self { run: None }
    }

    /// Run the teardown.
    pub fn run(mut self) {
        if let Some(f) = self.run.take() {
            f();
        }
    }
}

impl Default for Cleanup {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Debug for Cleanup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cleanup")
            .field("pending", &self.run.is_some())
            .finish()
    }
}

/// The per-render hook surface a host framework exposes.
///
/// Hooks are positional: a component must call them in the same order on
/// every render.
pub trait Host {
    /// Render trigger handed out by [`Host::use_render_trigger`].
    type Trigger: RenderTrigger + Clone + 'static;

    /// Get the trigger for the component being rendered.
    fn use_render_trigger(&mut self) -> Self::Trigger;

    /// Register an effect keyed by `key`.
    ///
    /// `setup` runs after the render commits, on the first render and on
    /// every render whose key differs from the previous one. The cleanup it
    /// returns runs before the next setup and when the component unmounts.
    fn use_effect<K, F>(&mut self, key: K, setup: F)
    where
        K: PartialEq + 'static,
        F: FnOnce() -> Cleanup + 'static;

    /// Return the value cached for `key`, computing it if the key changed.
    fn use_memo<K, V, F>(&mut self, key: K, compute: F) -> V
    where
        K: PartialEq + 'static,
        V: Clone + 'static,
        F: FnOnce() -> V;
}
