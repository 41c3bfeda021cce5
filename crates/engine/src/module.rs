// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Named bundles of rules and constraints registered as one unit

use crate::rule::{ConstraintDescriptor, RuleDescriptor};
use rf_core::Meta;
use serde_json::Value;

/// A named bundle of rules, constraints, and shared meta
///
/// Shared meta is merged into every member when the module is registered;
/// keys already set on a member win.
pub struct Module<C> {
    pub name: String,
    pub rules: Vec<RuleDescriptor<C>>,
    pub constraints: Vec<ConstraintDescriptor<C>>,
    pub meta: Meta,
}

impl<C> Module<C> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
            constraints: Vec::new(),
            meta: Meta::new(),
        }
    }

    pub fn rule(mut self, rule: RuleDescriptor<C>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn constraint(mut self, constraint: ConstraintDescriptor<C>) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }
}

impl<C> Clone for Module<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            rules: self.rules.clone(),
            constraints: self.constraints.clone(),
            meta: self.meta.clone(),
        }
    }
}

impl<C> std::fmt::Debug for Module<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("rules", &self.rules)
            .field("constraints", &self.constraints)
            .field("meta", &self.meta)
            .finish()
    }
}
