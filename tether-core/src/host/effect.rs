//! Effect slots for the reference host.
//!
//! An effect slot remembers the key it was last staged with and the cleanup
//! returned by its last setup. Staging happens during render; the setup only
//! runs when the render commits.
//!
//! # Lifecycle
//!
//! 1. Render: the key is compared with the previous one. If it changed, the
//!    setup is queued as a [`PendingEffect`].
//!
//! 2. Commit: the previous cleanup runs, then the new setup, and its cleanup
//!    is stored.
//!
//! 3. Unmount: the stored cleanup runs and the cell is disposed. A disposed
//!    cell ignores any further commits.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use super::traits::Cleanup;

/// Per-call-site state of an effect.
pub(crate) struct EffectSlot<K> {
    key: Option<K>,
    cell: Rc<EffectCell>,
}

impl<K> EffectSlot<K>
where
    K: PartialEq,
{
    pub(crate) fn new() -> Self {
        Self {
            key: None,
            cell: Rc::new(EffectCell::default()),
        }
    }

    pub(crate) fn cell(&self) -> Rc<EffectCell> {
        Rc::clone(&self.cell)
    }

    /// Record the key for this render. Returns whether it changed.
    pub(crate) fn stage(&mut self, key: K) -> bool {
        if self.key.as_ref() == Some(&key) {
            return false;
        }
        self.key = Some(key);
        true
    }
}

/// Cleanup storage shared between a slot and its pending commits.
#[derive(Default)]
pub(crate) struct EffectCell {
    cleanup: RefCell<Option<Cleanup>>,
    run_count: Cell<usize>,
    disposed: Cell<bool>,
}

impl EffectCell {
    /// Run the previous cleanup, then `setup`, keeping its cleanup.
    pub(crate) fn execute(&self, setup: Box<dyn FnOnce() -> Cleanup>) {
        if self.disposed.get() {
            return;
        }

        let previous = self.cleanup.borrow_mut().take();
        if let Some(previous) = previous {
            previous.run();
        }

        let cleanup = setup();
        *self.cleanup.borrow_mut() = Some(cleanup);
        self.run_count.set(self.run_count.get() + 1);
    }

    /// Run the stored cleanup and refuse further runs.
    pub(crate) fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        let cleanup = self.cleanup.borrow_mut().take();
        if let Some(cleanup) = cleanup {
            cleanup.run();
        }
    }

    pub(crate) fn run_count(&self) -> usize {
        self.run_count.get()
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.disposed.get()
    }
}

impl fmt::Debug for EffectCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectCell")
            .field("run_count", &self.run_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// A setup queued during render, run at commit.
pub(crate) struct PendingEffect {
    cell: Rc<EffectCell>,
    setup: Box<dyn FnOnce() -> Cleanup>,
}

impl PendingEffect {
    pub(crate) fn new(cell: Rc<EffectCell>, setup: Box<dyn FnOnce() -> Cleanup>) -> Self {
        Self { cell, setup }
    }

    pub(crate) fn commit(self) {
        self.cell.execute(self.setup);
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn counting_setup(log: &Rc<RefCell<Vec<String>>>, name: &str) -> Box<dyn FnOnce() -> Cleanup> {
        let log = log.clone();
        let name = name.to_string();
        Box::new(move || {
            log.borrow_mut().push(format!("setup {name}"));
            Cleanup::new(move || log.borrow_mut().push(format!("cleanup {name}")))
        })
    }

    #[test]
    fn stage_reports_key_changes() {
        let mut slot = EffectSlot::new();

        assert!(slot.stage(1));
        assert!(!slot.stage(1));
        assert!(slot.stage(2));
        assert!(slot.stage(1));
    }

    #[test]
    fn previous_cleanup_runs_before_next_setup() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let cell = Rc::new(EffectCell::default());

        PendingEffect::new(cell.clone(), counting_setup(&log, "a")).commit();
        PendingEffect::new(cell.clone(), counting_setup(&log, "b")).commit();

        assert_eq!(*log.borrow(), vec!["setup a", "cleanup a", "setup b"]);
        assert_eq!(cell.run_count(), 2);
    }

    #[test]
    fn dispose_runs_cleanup_once_and_blocks_further_runs() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let cell = Rc::new(EffectCell::default());

        cell.execute(counting_setup(&log, "a"));
        cell.dispose();
        cell.dispose();
        cell.execute(counting_setup(&log, "b"));

        assert_eq!(*log.borrow(), vec!["setup a", "cleanup a"]);
        assert!(cell.is_disposed());
        assert_eq!(cell.run_count(), 1);
    }
}
