//! Responsiveness policies.
//!
//! A binding's responsiveness decides which store notifications are allowed
//! to re-render the bound component: all of them, none of them, or those a
//! predicate accepts.

use std::fmt;
use std::rc::Rc;

/// Which notifications force a render.
pub enum Responsiveness<T> {
    /// Every notification forces a render.
    Always,
    /// No subscription is made; the component sees new values only when it
    /// renders for some other reason.
    Never,
    /// Force a render when the predicate returns true for `(next, prev)`.
    When(Rc<dyn Fn(&T, &T) -> bool>),
}

/// Identity of a [`Responsiveness`], used to key the subscription effect.
///
/// Predicates are identified by their allocation. Build a predicate once and
/// clone it into each render; a closure rebuilt on every render changes the
/// key and resubscribes every time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponsivenessKey {
    Always,
    Never,
    Predicate(usize),
}

impl<T> Responsiveness<T> {
    /// Respond only to notifications the predicate accepts.
    ///
    /// ```rust
    /// use tether_core::binding::Responsiveness;
    ///
    /// #[derive(Clone)]
    /// struct User { id: u32, name: String }
    ///
    /// let on_new_user = Responsiveness::when(|next: &User, prev: &User| next.id != prev.id);
    /// # let _ = on_new_user;
    /// ```
    pub fn when<F>(predicate: F) -> Self
    where
        F: Fn(&T, &T) -> bool + 'static,
    {
        Responsiveness::When(Rc::new(predicate))
    }

    /// Whether a subscription should exist at all.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Responsiveness::Never)
    }

    /// Whether the notification `(next, prev)` should force a render.
    pub fn admits(&self, next: &T, prev: &T) -> bool {
        match self {
            Responsiveness::Always => true,
            Responsiveness::Never => false,
            Responsiveness::When(predicate) => predicate(next, prev),
        }
    }

    /// Identity key of this policy.
    pub fn key(&self) -> ResponsivenessKey {
        match self {
            Responsiveness::Always => ResponsivenessKey::Always,
            Responsiveness::Never => ResponsivenessKey::Never,
            Responsiveness::When(predicate) => {
                ResponsivenessKey::Predicate(Rc::as_ptr(predicate).cast::<()>() as usize)
            }
        }
    }
}

impl<T> Clone for Responsiveness<T> {
    fn clone(&self) -> Self {
        match self {
            Responsiveness::Always => Responsiveness::Always,
            Responsiveness::Never => Responsiveness::Never,
            Responsiveness::When(predicate) => Responsiveness::When(Rc::clone(predicate)),
        }
    }
}

impl<T> Default for Responsiveness<T> {
    fn default() -> Self {
        Responsiveness::Always
    }
}

impl<T> From<bool> for Responsiveness<T> {
    fn from(responsive: bool) -> Self {
        if responsive {
            Responsiveness::Always
        } else {
            Responsiveness::Never
        }
    }
}

impl<T> fmt::Debug for Responsiveness<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Responsiveness::Always => f.write_str("Always"),
            Responsiveness::Never => f.write_str("Never"),
            Responsiveness::When(_) => f.write_str("When(..)"),
        }
    }
}
