//! Binding Adapter
//!
//! Binds one component to one store. Each call returns the store's current
//! value and a stable setter; behind the scenes it keeps a subscription alive
//! for as long as the component stays bound, and uses it to force renders.
//!
//! # Association lifecycle
//!
//! ```text
//!                   effect setup (responsive)
//!   Unsubscribed ──────────────────────────────▶ SubscribedUninitialized
//!        ▲                                                 │
//!        │ cleanup (key change / unmount)                  │ force one render
//!        │                                                 ▼
//!        └─────────────────────────────────────────── SubscribedSynced
//! ```
//!
//! The effect is keyed by `(store, responsiveness)`. With
//! [`Responsiveness::Never`] the setup returns without subscribing and the
//! association stays `Unsubscribed`.
//!
//! The forced render on subscription closes a gap: the component's first
//! render read the value before the subscription existed, and any write in
//! between would otherwise go unseen.

use std::any::{type_name, Any};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use super::responsiveness::{Responsiveness, ResponsivenessKey};
use super::setter::Setter;
use crate::error::{Error, Result};
use crate::host::{Cleanup, Host, RenderTrigger};
use crate::store::{is_container, Observer, SharedStore, Store, StoreId};

/// Where a binding stands with its store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssociationState {
    /// No active subscription.
    Unsubscribed,
    /// Subscribed; the synchronizing render has not been forced yet.
    SubscribedUninitialized,
    /// Subscribed and synchronized; notifications now force renders.
    SubscribedSynced,
}

/// Dependency key of the subscription effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingKey {
    pub store: StoreId,
    pub responsiveness: ResponsivenessKey,
}

/// Shared handle to one binding's association state.
///
/// Returned by [`bind_with_probe`] for diagnostics; the adapter owns the
/// transitions.
#[derive(Clone)]
pub struct Association {
    inner: Rc<AssociationInner>,
}

struct AssociationInner {
    state: Cell<AssociationState>,
    initialized: Cell<bool>,
}

impl Association {
    fn new() -> Self {
        Self {
            inner: Rc::new(AssociationInner {
                state: Cell::new(AssociationState::Unsubscribed),
                initialized: Cell::new(false),
            }),
        }
    }

    /// Current state.
    pub fn state(&self) -> AssociationState {
        self.inner.state.get()
    }

    /// Whether the synchronizing render was forced for the current
    /// subscription.
    pub fn is_initialized(&self) -> bool {
        self.inner.initialized.get()
    }

    fn attach<T, G>(
        &self,
        store: SharedStore<T>,
        responsiveness: Responsiveness<T>,
        trigger: G,
    ) -> Cleanup
    where
        T: 'static,
        G: RenderTrigger + Clone + 'static,
    {
        let store_id = store.store_id();
        if !responsiveness.is_enabled() {
            debug!(store = %store_id, "binding unresponsive; not subscribing");
            self.transition(store_id, AssociationState::Unsubscribed);
            return Cleanup::none();
        }

        let notify = trigger.clone();
        let subscription = store
            .subscribe(Observer::new(move |next: &T, prev: &T| {
                if responsiveness.admits(next, prev) {
                    notify.force_render();
                }
            }))
            .into_guard();
        self.transition(store_id, AssociationState::SubscribedUninitialized);

        if !self.inner.initialized.replace(true) {
            trigger.force_render();
        }
        self.transition(store_id, AssociationState::SubscribedSynced);

        let association = self.clone();
        Cleanup::new(move || {
            drop(subscription);
            association.detach(store_id);
        })
    }

    fn detach(&self, store_id: StoreId) {
        self.inner.initialized.set(false);
        self.transition(store_id, AssociationState::Unsubscribed);
    }

    fn transition(&self, store_id: StoreId, next: AssociationState) {
        let prev = self.inner.state.replace(next);
        if prev != next {
            debug!(store = %store_id, from = ?prev, to = ?next, "association transition");
        }
    }
}

impl fmt::Debug for Association {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Association")
            .field("state", &self.state())
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

/// Bind the component being rendered to `store`.
///
/// Returns the value read from the store at call time and a setter that
/// stays equal across renders while the store stays the same. Hooks are
/// used in a fixed order, so the call must not be conditional.
///
/// # Example
///
/// ```rust
/// use tether_core::binding::bind;
/// use tether_core::host::Component;
/// use tether_core::store::Store;
///
/// let count = Store::new(0);
///
/// let store = count.clone();
/// let mut view = Component::mount(move |hooks| {
///     let (value, _set_count) = bind(hooks, &store, true);
///     format!("count = {value}")
/// });
///
/// count.set_state(3);
/// view.flush().unwrap();
/// assert_eq!(view.output().unwrap(), "count = 3");
/// ```
pub fn bind<H, T>(
    host: &mut H,
    store: &Store<T>,
    responsiveness: impl Into<Responsiveness<T>>,
) -> (T, Setter<T>)
where
    H: Host,
    T: Clone + 'static,
{
    let (state, setter, _) = associate(host, store.id(), || store.shared(), responsiveness.into());
    (state, setter)
}

/// [`bind`] for a type-erased store handle.
pub fn bind_shared<H, T>(
    host: &mut H,
    store: SharedStore<T>,
    responsiveness: impl Into<Responsiveness<T>>,
) -> (T, Setter<T>)
where
    H: Host,
    T: 'static,
{
    let store_id = store.store_id();
    let (state, setter, _) = associate(host, store_id, move || store, responsiveness.into());
    (state, setter)
}

/// [`bind`] for a value of unknown type, such as one pulled from a context
/// registry.
///
/// Fails with [`Error::InvalidArgument`] if `value` is not a store of `T`.
/// The check runs before any hook, so a failed call leaves no subscription
/// behind.
pub fn bind_any<H, T>(
    host: &mut H,
    value: &dyn Any,
    responsiveness: impl Into<Responsiveness<T>>,
) -> Result<(T, Setter<T>)>
where
    H: Host,
    T: Clone + 'static,
{
    let invalid = || Error::InvalidArgument {
        expected: type_name::<T>(),
    };

    if !is_container::<T>(value) {
        debug!(expected = type_name::<T>(), "rejected value without store capability");
        return Err(invalid());
    }

    match value.downcast_ref::<Store<T>>() {
        Some(store) => Ok(bind(host, store, responsiveness)),
        None => {
            let shared = value.downcast_ref::<SharedStore<T>>().ok_or_else(invalid)?;
            Ok(bind_shared(host, Rc::clone(shared), responsiveness))
        }
    }
}

/// [`bind`], also returning the association handle.
pub fn bind_with_probe<H, T>(
    host: &mut H,
    store: &Store<T>,
    responsiveness: impl Into<Responsiveness<T>>,
) -> (T, Setter<T>, Association)
where
    H: Host,
    T: Clone + 'static,
{
    associate(host, store.id(), || store.shared(), responsiveness.into())
}

fn associate<H, T, S>(
    host: &mut H,
    store_id: StoreId,
    shared: S,
    responsiveness: Responsiveness<T>,
) -> (T, Setter<T>, Association)
where
    H: Host,
    T: 'static,
    S: FnOnce() -> SharedStore<T>,
{
    let trigger = host.use_render_trigger();
    let setter = host.use_memo(store_id, || Setter::new(shared()));
    let association = host.use_memo((), Association::new);

    let key = BindingKey {
        store: store_id,
        responsiveness: responsiveness.key(),
    };
    let store = Rc::clone(setter.store());
    let state = store.get_state();

    let effect_association = association.clone();
    host.use_effect(key, move || {
        effect_association.attach(store, responsiveness, trigger)
    });

    (state, setter, association)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
