//! Reference Host
//!
//! A minimal component host: enough render scheduling, effects and memos to
//! drive the binding adapter outside a real UI framework. Real applications
//! implement [`Host`] on their own framework instead.
//!
//! # How It Works
//!
//! 1. [`Component::mount`] runs the render closure once and commits the
//!    effects it staged.
//!
//! 2. A [`Trigger`] obtained during render advances the component's render
//!    token and marks it dirty. Nothing re-renders until the owner calls
//!    [`Component::flush`], mirroring a framework that batches renders.
//!
//! 3. [`Component::flush`] renders while the component is dirty. A component
//!    that keeps forcing renders fails after [`MAX_FLUSH_PASSES`].
//!
//! 4. [`Component::unmount`] (or dropping the component) disposes every
//!    effect in slot order.
//!
//! Hooks are positional. If the type stored at a slot changes between
//! renders, the slot is replaced and a warning is logged.

use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace, warn};

use super::context::RenderContext;
use super::effect::{EffectCell, EffectSlot, PendingEffect};
use super::memo::MemoSlot;
use super::traits::{Cleanup, Host, RenderTrigger};
use crate::error::{Error, Result};

/// Upper bound on render passes in a single [`Component::flush`].
pub const MAX_FLUSH_PASSES: usize = 64;

/// Unique identifier for a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentId(u64);

impl ComponentId {
    /// Generate a new unique component ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ComponentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "component#{}", self.0)
    }
}

/// State shared between a component and the triggers it hands out.
struct Shared {
    id: ComponentId,
    token: Cell<u64>,
    dirty: Cell<bool>,
    mounted: Cell<bool>,
}

/// Render trigger for one component.
///
/// Holds the component weakly: triggering a dropped or unmounted component
/// does nothing.
#[derive(Clone)]
pub struct Trigger {
    shared: Weak<Shared>,
}

impl RenderTrigger for Trigger {
    fn force_render(&self) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        if !shared.mounted.get() {
            trace!(component = %shared.id, "render forced after unmount; ignored");
            return;
        }

        let token = shared.token.get() + 1;
        shared.token.set(token);
        shared.dirty.set(true);

        trace!(
            component = %shared.id,
            token,
            during_render = RenderContext::is_rendering(shared.id),
            "render forced"
        );
    }
}

impl fmt::Debug for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.shared.upgrade().map(|shared| shared.id);
        f.debug_struct("Trigger").field("component", &id).finish()
    }
}

#[derive(Default)]
struct HookState {
    slots: Vec<Box<dyn Any>>,
    effects: Vec<Rc<EffectCell>>,
}

/// Hook surface for one render pass of a [`Component`].
pub struct Hooks<'a> {
    shared: &'a Rc<Shared>,
    state: &'a mut HookState,
    cursor: usize,
    pending: Vec<PendingEffect>,
}

impl Hooks<'_> {
    /// The component being rendered.
    pub fn component_id(&self) -> ComponentId {
        self.shared.id
    }

    /// Component-local value that survives re-renders.
    ///
    /// `init` runs on the first render only.
    pub fn use_ref<S, F>(&mut self, init: F) -> Rc<S>
    where
        S: 'static,
        F: FnOnce() -> S,
    {
        Rc::clone(self.slot(|| Rc::new(init())))
    }

    fn slot<S, F>(&mut self, init: F) -> &mut S
    where
        S: 'static,
        F: FnOnce() -> S,
    {
        let index = self.cursor;
        self.cursor += 1;

        // Slots are created in call order, so `index` is at most `len`.
        let slots = &mut self.state.slots;
        if index == slots.len() {
            slots.push(Box::new(init()));
        } else if !slots[index].is::<S>() {
            warn!(
                component = %self.shared.id,
                slot = index,
                "hook slot type changed between renders; replacing"
            );
            slots[index] = Box::new(init());
        }

        slots[index]
            .downcast_mut::<S>()
            .expect("hook slot type checked above")
    }
}

impl Host for Hooks<'_> {
    type Trigger = Trigger;

    fn use_render_trigger(&mut self) -> Trigger {
        Trigger {
            shared: Rc::downgrade(self.shared),
        }
    }

    fn use_effect<K, F>(&mut self, key: K, setup: F)
    where
        K: PartialEq + 'static,
        F: FnOnce() -> Cleanup + 'static,
    {
        let mut created = None;
        let slot = self.slot(|| {
            let slot = EffectSlot::<K>::new();
            created = Some(slot.cell());
            slot
        });

        let changed = slot.stage(key);
        let cell = slot.cell();

        if let Some(created) = created {
            self.state.effects.push(created);
        }
        if changed {
            self.pending.push(PendingEffect::new(cell, Box::new(setup)));
        }
    }

    fn use_memo<K, V, F>(&mut self, key: K, compute: F) -> V
    where
        K: PartialEq + 'static,
        V: Clone + 'static,
        F: FnOnce() -> V,
    {
        self.slot(MemoSlot::<K, V>::new).get_or_compute(key, compute)
    }
}

/// A component instance in the reference host.
///
/// # Example
///
/// ```rust
/// use tether_core::host::Component;
///
/// let mut greeting = Component::mount(|_hooks| String::from("hello"));
/// assert_eq!(greeting.output(), Some(&String::from("hello")));
/// assert_eq!(greeting.render_count(), 1);
/// ```
pub struct Component<R> {
    shared: Rc<Shared>,
    render: Box<dyn FnMut(&mut Hooks<'_>) -> R>,
    hooks: HookState,
    output: Option<R>,
    render_count: usize,
}

impl<R> Component<R> {
    /// Create a component, render it once and commit its effects.
    pub fn mount<F>(render: F) -> Self
    where
        F: FnMut(&mut Hooks<'_>) -> R + 'static,
    {
        let mut component = Self {
            shared: Rc::new(Shared {
                id: ComponentId::new(),
                token: Cell::new(0),
                dirty: Cell::new(false),
                mounted: Cell::new(true),
            }),
            render: Box::new(render),
            hooks: HookState::default(),
            output: None,
            render_count: 0,
        };

        debug!(component = %component.id(), "component mounted");
        component.render_pass();
        component
    }

    /// Get the component's unique ID.
    pub fn id(&self) -> ComponentId {
        self.shared.id
    }

    /// Current render token. Advances once per forced render.
    pub fn render_token(&self) -> u64 {
        self.shared.token.get()
    }

    /// Number of completed render passes, the mount render included.
    pub fn render_count(&self) -> usize {
        self.render_count
    }

    /// Output of the latest render.
    pub fn output(&self) -> Option<&R> {
        self.output.as_ref()
    }

    /// Whether a render was forced since the last render pass.
    pub fn is_dirty(&self) -> bool {
        self.shared.dirty.get()
    }

    /// Whether the component is still mounted.
    pub fn is_mounted(&self) -> bool {
        self.shared.mounted.get()
    }

    /// Render again regardless of the dirty flag, as a parent re-render would.
    pub fn rerender(&mut self) -> Result<()> {
        self.ensure_mounted()?;
        self.render_pass();
        Ok(())
    }

    /// Render until no more renders are forced. Returns the number of passes.
    pub fn flush(&mut self) -> Result<usize> {
        self.ensure_mounted()?;

        let mut passes = 0;
        while self.shared.dirty.get() {
            if passes == MAX_FLUSH_PASSES {
                warn!(component = %self.id(), passes, "render loop detected");
                return Err(Error::RenderLoop {
                    component: self.id(),
                    passes,
                });
            }
            self.render_pass();
            passes += 1;
        }
        Ok(passes)
    }

    /// Dispose every effect and stop accepting renders. Idempotent.
    pub fn unmount(&mut self) {
        if !self.shared.mounted.replace(false) {
            return;
        }

        let effects = std::mem::take(&mut self.hooks.effects);
        for effect in &effects {
            effect.dispose();
        }
        self.shared.dirty.set(false);

        debug!(component = %self.id(), effects = effects.len(), "component unmounted");
    }

    fn ensure_mounted(&self) -> Result<()> {
        if self.is_mounted() {
            Ok(())
        } else {
            Err(Error::Unmounted(self.id()))
        }
    }

    fn render_pass(&mut self) {
        let id = self.shared.id;
        self.shared.dirty.set(false);

        let pending = {
            let _ctx = RenderContext::enter(id);
            let mut hooks = Hooks {
                shared: &self.shared,
                state: &mut self.hooks,
                cursor: 0,
                pending: Vec::new(),
            };
            let output = (self.render)(&mut hooks);
            let pending = hooks.pending;
            self.output = Some(output);
            pending
        };

        self.render_count += 1;
        trace!(
            component = %id,
            render = self.render_count,
            effects = pending.len(),
            depth = RenderContext::depth(),
            "render committed"
        );

        for effect in pending {
            effect.commit();
        }
    }
}

impl<R> Drop for Component<R> {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl<R> fmt::Debug for Component<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.id())
            .field("render_token", &self.render_token())
            .field("render_count", &self.render_count)
            .field("dirty", &self.is_dirty())
            .field("mounted", &self.is_mounted())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
