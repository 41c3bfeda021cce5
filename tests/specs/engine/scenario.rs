//! End-to-end discrete step specs
//!
//! The counter scenario: a step that pushes the count past 100 is applied,
//! and the violation is reported alongside it.

use crate::prelude::*;
use crate::prelude::assert_eq;

#[test]
fn increment_past_max_reports_a_violation() {
    let mut engine = counter_engine(50);

    let result = engine.step(&[increment(60)]);

    assert_eq!(result.state.context.count, 110);
    assert_eq!(result.state.facts, vec![Fact::new("Incremented", json!({ "amount": 60 }))]);
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::ConstraintViolation);
    assert_eq!(result.diagnostics[0].source_id, "max100");
}

#[test]
fn step_result_serializes_with_wire_names() {
    let mut engine = counter_engine(100);

    let result = engine.step(&[increment(1)]);

    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({
            "state": {
                "context": { "count": 101 },
                "facts": [{ "tag": "Incremented", "payload": { "amount": 1 } }],
            },
            "diagnostics": [{
                "kind": "constraint-violation",
                "message": "constraint 'max100' violated",
                "sourceId": "max100",
            }],
        })
    );
}

#[test]
fn duplicate_ids_are_rejected() {
    let mut registry = Registry::new();
    registry.register_module(counter_module()).unwrap();

    let err = registry
        .register_rule(RuleDescriptor::new(
            "increment",
            "again",
            |_: &mut EngineState<Counter>, _: &[Event]| Ok(Vec::new()),
        ))
        .unwrap_err();

    assert!(matches!(err, RegistryError::DuplicateRule(id) if id == "increment"));
    assert_eq!(registry.rule_count(), 1);
}

#[test]
fn failing_rules_do_not_stop_later_rules_or_constraints() {
    let mut registry = Registry::new();
    registry
        .register_rule(RuleDescriptor::new(
            "broken",
            "Always fails",
            |_: &mut EngineState<Counter>, _: &[Event]| Err(BoxError::from("no luck")),
        ))
        .unwrap();
    registry.register_module(counter_module()).unwrap();
    registry
        .register_constraint(ConstraintDescriptor::new(
            "even",
            "Count is even",
            |state: &EngineState<Counter>| {
                Ok(if state.context.count % 2 == 0 {
                    Check::Pass
                } else {
                    Check::Violation(format!("count {} is odd", state.context.count))
                })
            },
        ))
        .unwrap();
    let mut engine = Engine::new(registry, Counter { count: 100 });

    let result = engine.step(&[increment(1)]);

    assert_eq!(result.state.context.count, 101);
    let kinds: Vec<_> = result
        .diagnostics
        .iter()
        .map(|d| (d.kind, d.source_id.as_str()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (DiagnosticKind::RuleError, "broken"),
            (DiagnosticKind::ConstraintViolation, "max100"),
            (DiagnosticKind::ConstraintViolation, "even"),
        ]
    );
    assert_eq!(result.diagnostics[2].message, "count 101 is odd");
}

#[test]
fn step_config_runs_only_the_selected_rules() {
    let mut engine = counter_engine(0);

    let result = engine.step_with_config(
        &[increment(5)],
        &StepConfig::all().rules(["missing"]).constraints(Vec::<String>::new()),
    );

    assert_eq!(result.state.context.count, 0);
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::RuleError);
    assert_eq!(result.diagnostics[0].source_id, "missing");
}
