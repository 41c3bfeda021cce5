//! Ownership specs: callers never hold the live context, and nothing from
//! one step leaks into the next result.

use crate::prelude::*;
use crate::prelude::assert_eq;

#[test]
fn returned_context_is_a_copy() {
    let mut engine = counter_engine(5);

    let mut first = engine.get_context();
    first.count = 999;

    assert_eq!(engine.get_context().count, 5);

    let mut result = engine.step(&[]);
    result.state.context.count = 999;
    assert_eq!(engine.get_context().count, 5);
}

#[test]
fn facts_and_diagnostics_reset_each_step() {
    let mut engine = counter_engine(100);

    let first = engine.step(&[increment(1)]);
    assert_eq!(first.state.facts.len(), 1);
    assert_eq!(first.diagnostics.len(), 1);

    let second = engine.step(&[Event::tag_only("Noise")]);
    assert!(second.state.facts.is_empty());
    // Count is still 101, so the constraint reports again from fresh state
    assert_eq!(second.diagnostics.len(), 1);

    engine.update_context(|c| Counter { count: c.count - 50 });
    let third = engine.step(&[]);
    assert!(third.is_clean());
    assert_eq!(third.state.context.count, 51);
}

#[test]
fn shared_engines_step_the_same_state() {
    let engine = SharedEngine::new(counter_engine(0));
    let other = engine.clone();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = engine.clone();
            std::thread::spawn(move || {
                for _ in 0..10 {
                    engine.step(&[increment(1)]);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(other.get_context().count, 40);
    assert_eq!(other.step_count(), 40);
}
