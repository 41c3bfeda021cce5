// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `counter` module stepped by `rf`

use rf_core::{BoxError, EngineState, Event, Fact};
use rf_engine::{Check, ConstraintDescriptor, Module, RuleDescriptor};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const MODULE_NAME: &str = "counter";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Counter {
    pub count: i64,
}

/// Rules `increment` and `reset`, and the `max` constraint
pub fn module(max: i64) -> Module<Counter> {
    Module::new(MODULE_NAME)
        .rule(RuleDescriptor::new(
            "increment",
            "Add payload.amount (default 1) to the count on Increment",
            increment,
        ))
        .rule(RuleDescriptor::new(
            "reset",
            "Set the count to zero on Reset",
            reset,
        ))
        .constraint(ConstraintDescriptor::new(
            "max",
            "Count stays at or below the configured max",
            move |state: &EngineState<Counter>| Ok(check_max(state.context.count, max)),
        ))
        .with_meta("max", max)
}

fn increment(state: &mut EngineState<Counter>, events: &[Event]) -> Result<Vec<Fact>, BoxError> {
    let mut facts = Vec::new();
    for event in events.iter().filter(|e| e.is("Increment")) {
        let amount = match event.payload_field("amount") {
            None | Some(Value::Null) => 1,
            Some(value) => value
                .as_i64()
                .ok_or_else(|| format!("amount must be an integer, got {}", value))?,
        };
        state.context.count = state
            .context
            .count
            .checked_add(amount)
            .ok_or("count overflowed")?;
        facts.push(Fact::new(
            "Incremented",
            json!({ "amount": amount, "count": state.context.count }),
        ));
    }
    Ok(facts)
}

fn reset(state: &mut EngineState<Counter>, events: &[Event]) -> Result<Vec<Fact>, BoxError> {
    if !events.iter().any(|e| e.is("Reset")) {
        return Ok(Vec::new());
    }
    let previous = std::mem::take(&mut state.context.count);
    Ok(vec![Fact::new("WasReset", json!({ "previous": previous }))])
}

fn check_max(count: i64, max: i64) -> Check {
    if count > max {
        Check::Violation(format!("count {} exceeds max {}", count, max))
    } else {
        Check::Pass
    }
}

#[cfg(test)]
#[path = "counter_tests.rs"]
mod tests;
