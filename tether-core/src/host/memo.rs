//! Keyed memo slots for the reference host.
//!
//! A memo slot caches one value together with the key it was computed for.
//! Reading it with the same key returns a clone of the cached value; a
//! different key recomputes. Keys are compared with `PartialEq`, values never
//! are.

/// Cached value for one `use_memo` call site.
pub(crate) struct MemoSlot<K, V> {
    entry: Option<(K, V)>,
}

impl<K, V> MemoSlot<K, V>
where
    K: PartialEq,
    V: Clone,
{
    pub(crate) fn new() -> Self {
        Self { entry: None }
    }

    /// Return the cached value for `key`, recomputing if the key changed.
    pub(crate) fn get_or_compute<F>(&mut self, key: K, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some((cached_key, value)) = &self.entry {
            if *cached_key == key {
                return value.clone();
            }
        }

        let value = compute();
        self.entry = Some((key, value.clone()));
        value
    }
}
