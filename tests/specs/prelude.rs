//! Shared fixtures for behavioral specs

pub use rf_actors::{ActorCall, ActorError, ActorManager, RecordingActor, ReactiveMirror};
pub use rf_core::{BoxError, DiagnosticKind, EngineState, Event, Fact};
pub use rf_engine::{
    Check, ConstraintDescriptor, Engine, Module, Registry, RegistryError, RuleDescriptor,
    SharedEngine, StepConfig,
};
pub use rf_reactive::ReactiveEngine;
pub use serde_json::{json, Value};
pub use similar_asserts::assert_eq;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Counter {
    pub count: i64,
}

/// `increment` adds `payload.amount` to the count; `max100` rejects counts
/// above 100
pub fn counter_module() -> Module<Counter> {
    Module::new("counter")
        .rule(RuleDescriptor::new(
            "increment",
            "Add the event amount to the count",
            |state: &mut EngineState<Counter>, events: &[Event]| {
                let mut facts = Vec::new();
                for event in events.iter().filter(|e| e.is("Increment")) {
                    let amount = event
                        .payload_field("amount")
                        .and_then(Value::as_i64)
                        .unwrap_or(1);
                    state.context.count += amount;
                    facts.push(Fact::new("Incremented", json!({ "amount": amount })));
                }
                Ok(facts)
            },
        ))
        .constraint(ConstraintDescriptor::new(
            "max100",
            "Count stays at or below 100",
            |state: &EngineState<Counter>| Ok(state.context.count <= 100),
        ))
}

pub fn counter_engine(count: i64) -> Engine<Counter> {
    let mut registry = Registry::new();
    registry.register_module(counter_module()).unwrap();
    Engine::new(registry, Counter { count })
}

pub fn increment(amount: i64) -> Event {
    Event::new("Increment", json!({ "amount": amount }))
}
