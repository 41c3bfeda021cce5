//! Reactive store specs: writes notify once per apply, and only when a
//! value actually changed.

use crate::prelude::*;
use crate::prelude::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn counted(engine: &ReactiveEngine) -> Arc<AtomicUsize> {
    let calls = Arc::new(AtomicUsize::new(0));
    let sink = Arc::clone(&calls);
    engine.subscribe(move |_| {
        sink.fetch_add(1, Ordering::SeqCst);
    });
    calls
}

#[test]
fn writing_an_equal_value_does_not_notify() {
    let engine = ReactiveEngine::new(json!({ "count": 0 }));
    let calls = counted(&engine);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    engine.apply(|s| {
        s.context().set("count", 0).unwrap();
    });

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn many_nested_writes_notify_once() {
    let engine = ReactiveEngine::new(json!({ "count": 0, "user": { "name": "a", "tags": [] } }));
    let calls = counted(&engine);

    engine.apply(|s| {
        let mut context = s.context();
        context.set("count", 3).unwrap();
        let mut user = context.entry("user").unwrap();
        user.set("name", "b").unwrap();
        user.entry("tags").unwrap().push("admin").unwrap();
    });

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        engine.context(),
        json!({ "count": 3, "user": { "name": "b", "tags": ["admin"] } })
    );
}

#[test]
fn derived_boolean_notifies_on_transitions_only() {
    let engine = ReactiveEngine::new(json!({ "count": 0 }));
    let positive = engine.derived(|s| s.context["count"].as_i64().unwrap_or(0) > 0).unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let sink = Arc::clone(&calls);
    positive.subscribe(move |_| {
        sink.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    for (value, expected) in [(5, 2), (10, 2), (0, 3)] {
        engine.apply(|s| {
            s.context().set("count", value).unwrap();
        });
        assert_eq!(calls.load(Ordering::SeqCst), expected, "after count = {}", value);
    }
}

#[test]
fn unsubscribed_callbacks_stop_hearing_changes() {
    let engine = ReactiveEngine::new(json!({ "count": 0 }));
    let calls = Arc::new(AtomicUsize::new(0));
    let sink = Arc::clone(&calls);
    let subscription = engine.subscribe(move |_| {
        sink.fetch_add(1, Ordering::SeqCst);
    });

    subscription.unsubscribe();
    engine.apply(|s| {
        s.context().set("count", 1).unwrap();
    });

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(engine.subscriber_count(), 0);
}
