//! Error types.
//!
//! Only caller mistakes surface as errors. A panicking observer is not
//! converted into an error: it unwinds out of the `set_state` call that
//! triggered it, unchanged.

use thiserror::Error;

use crate::host::ComponentId;

/// Errors returned by the binding adapter and the reference host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A value handed to the binding adapter is not a store of the expected
    /// type. Raised before any hook runs or any subscription is made.
    #[error("invalid argument: expected an observable store of `{expected}`")]
    InvalidArgument {
        /// Value type the caller asked for.
        expected: &'static str,
    },

    /// A component kept forcing renders and never settled.
    #[error("{component} still dirty after {passes} render passes")]
    RenderLoop {
        component: ComponentId,
        passes: usize,
    },

    /// The component was already unmounted.
    #[error("{0} is unmounted")]
    Unmounted(ComponentId),
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;
