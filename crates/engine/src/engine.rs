// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Discrete step engine
//!
//! Each step runs two phases against the engine's own state:
//! 1. Rules, in registration order. Each sees the live context as left by
//!    the rules before it and the facts emitted so far in this step.
//! 2. Constraints, in registration order, against the post-rule state.
//!
//! A failing rule or constraint becomes a diagnostic and evaluation carries
//! on with the next one. Nothing raised by user code escapes `step`.

use crate::registry::Registry;
use rf_core::{
    isolate, Clock, Diagnostic, EngineConfig, EngineState, Event, Fact, Meta, SystemClock,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Meta keys written by the engine
pub mod meta_keys {
    pub const PROTOCOL_VERSION: &str = "protocolVersion";
    pub const CREATED_AT: &str = "createdAt";
    pub const STEP: &str = "step";
    pub const LAST_STEP_AT: &str = "lastStepAt";
}

/// Restricts a step to a subset of registered ids
///
/// `None` selects everything. Selected entries still run in registration
/// order; ids without a registered entry are reported as diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepConfig {
    pub rule_ids: Option<Vec<String>>,
    pub constraint_ids: Option<Vec<String>>,
}

impl StepConfig {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn rules<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rule_ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn constraints<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constraint_ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }
}

/// Context snapshot and the facts produced by one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepState<C> {
    pub context: C,
    pub facts: Vec<Fact>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult<C> {
    pub state: StepState<C>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<C> StepResult<C> {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn rule_errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_rule_error())
    }

    pub fn violations(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_constraint_violation())
    }

    pub fn facts_tagged<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Fact> + 'a {
        self.state.facts.iter().filter(move |f| f.is(tag))
    }
}

/// Owns a context and evaluates registered rules and constraints against it
pub struct Engine<C, K: Clock = SystemClock> {
    registry: Registry<C>,
    state: EngineState<C>,
    config: EngineConfig,
    clock: K,
    steps: u64,
}

impl<C: Clone> Engine<C, SystemClock> {
    pub fn new(registry: Registry<C>, context: C) -> Self {
        Self::with_clock(registry, context, EngineConfig::default(), SystemClock)
    }
}

impl<C: Clone, K: Clock> Engine<C, K> {
    pub fn with_clock(registry: Registry<C>, context: C, config: EngineConfig, clock: K) -> Self {
        let state = EngineState::new(context)
            .with_meta(
                meta_keys::PROTOCOL_VERSION,
                config.protocol_version.clone(),
            )
            .with_meta(meta_keys::CREATED_AT, clock.now().to_rfc3339());

        tracing::debug!(
            rules = registry.rule_count(),
            constraints = registry.constraint_count(),
            "engine created"
        );

        Self {
            registry,
            state,
            config,
            clock,
            steps: 0,
        }
    }

    /// Run every registered rule, then every registered constraint
    pub fn step(&mut self, events: &[Event]) -> StepResult<C> {
        self.step_with_config(events, &StepConfig::all())
    }

    /// Run only the rules and constraints selected by `config`
    pub fn step_with_config(&mut self, events: &[Event], config: &StepConfig) -> StepResult<C> {
        self.steps += 1;
        let span = tracing::debug_span!("engine.step", step = self.steps, events = events.len());
        let _guard = span.enter();

        self.state.facts.clear();
        self.state
            .meta
            .insert(meta_keys::STEP.to_string(), json!(self.steps));
        if self.config.stamp_steps {
            self.state.meta.insert(
                meta_keys::LAST_STEP_AT.to_string(),
                Value::String(self.clock.now().to_rfc3339()),
            );
        }

        let mut diagnostics = Vec::new();
        self.run_rules(events, config.rule_ids.as_deref(), &mut diagnostics);
        self.check_constraints(config.constraint_ids.as_deref(), &mut diagnostics);

        tracing::debug!(
            facts = self.state.facts.len(),
            diagnostics = diagnostics.len(),
            "step complete"
        );

        StepResult {
            state: StepState {
                context: self.state.context.clone(),
                facts: self.state.facts.clone(),
            },
            diagnostics,
        }
    }

    fn run_rules(
        &mut self,
        events: &[Event],
        ids: Option<&[String]>,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let state = &mut self.state;
        let selection = self.registry.select_rules(ids);

        for rule in selection.entries {
            match isolate(|| rule.run(state, events)) {
                // Facts are stored as returned, without shape checks
                Ok(facts) => state.facts.extend(facts),
                Err(failure) => {
                    tracing::warn!(rule = %rule.id, error = %failure, "rule failed");
                    diagnostics.push(Diagnostic::rule_error(&rule.id, failure.message));
                }
            }
        }

        for id in selection.missing {
            tracing::warn!(rule = id, "rule not found in registry");
            diagnostics.push(Diagnostic::rule_error(
                id,
                format!("rule '{}' not found in registry", id),
            ));
        }
    }

    fn check_constraints(&self, ids: Option<&[String]>, diagnostics: &mut Vec<Diagnostic>) {
        let selection = self.registry.select_constraints(ids);

        for constraint in selection.entries {
            let message = match isolate(|| constraint.check(&self.state)) {
                Ok(check) => check.violation_message(&constraint.id),
                Err(failure) => Some(failure.message),
            };
            if let Some(message) = message {
                tracing::debug!(constraint = %constraint.id, %message, "constraint violated");
                diagnostics.push(Diagnostic::constraint_violation(&constraint.id, message));
            }
        }

        for id in selection.missing {
            tracing::warn!(constraint = id, "constraint not found in registry");
            diagnostics.push(Diagnostic::constraint_violation(
                id,
                format!("constraint '{}' not found in registry", id),
            ));
        }
    }

    /// Copy of the current context
    pub fn get_context(&self) -> C {
        self.state.context.clone()
    }

    /// Copy of the context, the facts of the latest step, and meta
    pub fn get_state(&self) -> EngineState<C> {
        self.state.clone()
    }

    /// Replace the context with `f(context)`, bypassing rules and constraints
    pub fn update_context(&mut self, f: impl FnOnce(&C) -> C) {
        self.state.context = f(&self.state.context);
    }

    pub fn get_meta(&self) -> Meta {
        self.state.meta.clone()
    }

    pub fn set_meta(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.state.meta.insert(key.into(), value.into());
    }

    pub fn step_count(&self) -> u64 {
        self.steps
    }

    pub fn registry(&self) -> &Registry<C> {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
