// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rule and constraint descriptors

use rf_core::{BoxError, EngineState, Event, Fact, Meta};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Rule implementation: may mutate `state.context` and returns new facts
pub type RuleFn<C> =
    dyn Fn(&mut EngineState<C>, &[Event]) -> Result<Vec<Fact>, BoxError> + Send + Sync;

/// Constraint implementation: assesses the post-rule state
pub type ConstraintFn<C> = dyn Fn(&EngineState<C>) -> Result<Check, BoxError> + Send + Sync;

/// Outcome of a constraint check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    Pass,
    /// Violation with a generic message naming the constraint
    Fail,
    /// Violation with a specific message
    Violation(String),
}

impl Check {
    pub fn is_pass(&self) -> bool {
        matches!(self, Check::Pass)
    }

    /// Diagnostic message for a violation, `None` when the check passed
    pub fn violation_message(&self, constraint_id: &str) -> Option<String> {
        match self {
            Check::Pass => None,
            Check::Fail => Some(format!("constraint '{}' violated", constraint_id)),
            Check::Violation(message) => Some(message.clone()),
        }
    }
}

impl From<bool> for Check {
    fn from(passed: bool) -> Self {
        if passed {
            Check::Pass
        } else {
            Check::Fail
        }
    }
}

impl From<String> for Check {
    fn from(message: String) -> Self {
        Check::Violation(message)
    }
}

impl From<&str> for Check {
    fn from(message: &str) -> Self {
        Check::Violation(message.to_string())
    }
}

/// A uniquely-keyed rule
pub struct RuleDescriptor<C> {
    pub id: String,
    pub description: String,
    pub meta: Meta,
    run: Arc<RuleFn<C>>,
}

impl<C> RuleDescriptor<C> {
    pub fn new<F>(id: impl Into<String>, description: impl Into<String>, run: F) -> Self
    where
        F: Fn(&mut EngineState<C>, &[Event]) -> Result<Vec<Fact>, BoxError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            id: id.into(),
            description: description.into(),
            meta: Meta::new(),
            run: Arc::new(run),
        }
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    pub fn run(&self, state: &mut EngineState<C>, events: &[Event]) -> Result<Vec<Fact>, BoxError> {
        (self.run)(state, events)
    }
}

impl<C> Clone for RuleDescriptor<C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            description: self.description.clone(),
            meta: self.meta.clone(),
            run: Arc::clone(&self.run),
        }
    }
}

impl<C> fmt::Debug for RuleDescriptor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleDescriptor")
            .field("id", &self.id)
            .field("description", &self.description)
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

/// A uniquely-keyed constraint
pub struct ConstraintDescriptor<C> {
    pub id: String,
    pub description: String,
    pub meta: Meta,
    check: Arc<ConstraintFn<C>>,
}

impl<C> ConstraintDescriptor<C> {
    /// `check` may return anything convertible into a `Check`: `bool`,
    /// a violation message, or a `Check` itself
    pub fn new<F, R>(id: impl Into<String>, description: impl Into<String>, check: F) -> Self
    where
        F: Fn(&EngineState<C>) -> Result<R, BoxError> + Send + Sync + 'static,
        R: Into<Check>,
    {
        Self {
            id: id.into(),
            description: description.into(),
            meta: Meta::new(),
            check: Arc::new(move |state: &EngineState<C>| -> Result<Check, BoxError> {
                check(state).map(Into::into)
            }),
        }
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    pub fn check(&self, state: &EngineState<C>) -> Result<Check, BoxError> {
        (self.check)(state)
    }
}

impl<C> Clone for ConstraintDescriptor<C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            description: self.description.clone(),
            meta: self.meta.clone(),
            check: Arc::clone(&self.check),
        }
    }
}

impl<C> fmt::Debug for ConstraintDescriptor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintDescriptor")
            .field("id", &self.id)
            .field("description", &self.description)
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "rule_tests.rs"]
mod tests;
