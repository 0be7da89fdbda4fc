//! Property tests for store reads, writes and notification order.

use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;
use tether_core::store::{Store, Update};
use tether_core::is_container;

proptest! {
    #[test]
    fn new_store_reads_back_initial(v in any::<i64>()) {
        prop_assert_eq!(Store::new(v).get_state(), v);
    }

    #[test]
    fn last_write_wins(v in any::<i64>(), writes in prop::collection::vec(any::<i64>(), 1..16)) {
        let store = Store::new(v);
        for w in &writes {
            store.set_state(*w);
        }
        prop_assert_eq!(store.get_state(), *writes.last().expect("non-empty"));
    }

    #[test]
    fn updater_result_is_stored_and_observed(v in -1_000_i64..1_000, k in -1_000_i64..1_000) {
        let store = Store::new(v);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        let _unsubscribe = store.subscribe(move |next: &i64, prev: &i64| {
            seen_clone.borrow_mut().push((*next, *prev));
        });

        store.set_state(Update::with(move |x: &i64| x * 3 + k));

        prop_assert_eq!(store.get_state(), v * 3 + k);
        prop_assert_eq!(seen.borrow().clone(), vec![(v * 3 + k, v)]);
    }

    #[test]
    fn every_observer_runs_once_in_order(n in 0_usize..12, v in any::<i32>(), x in any::<i32>()) {
        let store = Store::new(v);
        let log = Rc::new(RefCell::new(Vec::new()));

        let _handles: Vec<_> = (0..n)
            .map(|i| {
                let log = log.clone();
                store.subscribe(move |next: &i32, prev: &i32| log.borrow_mut().push((i, *next, *prev)))
            })
            .collect();

        store.set_state(x);

        let expected: Vec<_> = (0..n).map(|i| (i, x, v)).collect();
        prop_assert_eq!(log.borrow().clone(), expected);
    }

    #[test]
    fn unsubscribed_observers_stay_silent(writes in prop::collection::vec(any::<u8>(), 0..8)) {
        let store = Store::new(0_u8);
        let calls = Rc::new(RefCell::new(0_usize));
        let calls_clone = calls.clone();

        let handle = store.subscribe(move |_: &u8, _: &u8| *calls_clone.borrow_mut() += 1);
        handle.unsubscribe();

        for w in writes {
            store.set_state(w);
        }
        prop_assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn plain_values_are_not_containers(v in any::<i64>(), s in ".*") {
        prop_assert!(!is_container::<i64>(&v));
        prop_assert!(!is_container::<i64>(&s));
        prop_assert!(is_container::<i64>(&Store::new(v)));
    }
}
