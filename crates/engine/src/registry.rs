// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Catalog of rule and constraint descriptors
//!
//! Entries are keyed by id and kept in registration order, which is also the
//! evaluation order used by the engine. There is no update or remove API.

use crate::error::RegistryError;
use crate::module::Module;
use crate::rule::{ConstraintDescriptor, RuleDescriptor};
use indexmap::IndexMap;
use rf_core::Meta;
use serde_json::Value;
use std::collections::HashSet;

pub struct Registry<C> {
    rules: IndexMap<String, RuleDescriptor<C>>,
    constraints: IndexMap<String, ConstraintDescriptor<C>>,
    modules: Vec<String>,
}

/// Entries picked for one phase of a step
pub(crate) struct Selection<'a, D> {
    /// Registered entries, in registration order
    pub entries: Vec<&'a D>,
    /// Requested ids with no registered entry, in request order
    pub missing: Vec<&'a str>,
}

impl<C> Registry<C> {
    pub fn new() -> Self {
        Self {
            rules: IndexMap::new(),
            constraints: IndexMap::new(),
            modules: Vec::new(),
        }
    }

    pub fn register_rule(&mut self, rule: RuleDescriptor<C>) -> Result<(), RegistryError> {
        if self.rules.contains_key(&rule.id) {
            return Err(RegistryError::DuplicateRule(rule.id));
        }
        self.rules.insert(rule.id.clone(), rule);
        Ok(())
    }

    pub fn register_constraint(
        &mut self,
        constraint: ConstraintDescriptor<C>,
    ) -> Result<(), RegistryError> {
        if self.constraints.contains_key(&constraint.id) {
            return Err(RegistryError::DuplicateConstraint(constraint.id));
        }
        self.constraints.insert(constraint.id.clone(), constraint);
        Ok(())
    }

    /// Register every rule and constraint of `module`
    ///
    /// All ids are validated first; on any duplicate nothing from the module
    /// is registered.
    pub fn register_module(&mut self, module: Module<C>) -> Result<(), RegistryError> {
        if self.modules.contains(&module.name) {
            return Err(RegistryError::DuplicateModule(module.name));
        }

        self.validate_module(&module)?;

        let Module {
            name,
            rules,
            constraints,
            meta,
        } = module;

        for mut rule in rules {
            merge_meta(&mut rule.meta, &meta, &name);
            self.rules.insert(rule.id.clone(), rule);
        }
        for mut constraint in constraints {
            merge_meta(&mut constraint.meta, &meta, &name);
            self.constraints.insert(constraint.id.clone(), constraint);
        }
        self.modules.push(name);
        Ok(())
    }

    fn validate_module(&self, module: &Module<C>) -> Result<(), RegistryError> {
        let mut rule_ids = HashSet::new();
        for rule in &module.rules {
            if self.rules.contains_key(&rule.id) || !rule_ids.insert(rule.id.as_str()) {
                return Err(RegistryError::DuplicateRule(rule.id.clone()));
            }
        }
        let mut constraint_ids = HashSet::new();
        for constraint in &module.constraints {
            if self.constraints.contains_key(&constraint.id)
                || !constraint_ids.insert(constraint.id.as_str())
            {
                return Err(RegistryError::DuplicateConstraint(constraint.id.clone()));
            }
        }
        Ok(())
    }

    pub fn rule(&self, id: &str) -> Option<&RuleDescriptor<C>> {
        self.rules.get(id)
    }

    pub fn constraint(&self, id: &str) -> Option<&ConstraintDescriptor<C>> {
        self.constraints.get(id)
    }

    pub fn contains_rule(&self, id: &str) -> bool {
        self.rules.contains_key(id)
    }

    pub fn contains_constraint(&self, id: &str) -> bool {
        self.constraints.contains_key(id)
    }

    pub fn rule_ids(&self) -> Vec<&str> {
        self.rules.keys().map(String::as_str).collect()
    }

    pub fn constraint_ids(&self) -> Vec<&str> {
        self.constraints.keys().map(String::as_str).collect()
    }

    /// All rules in registration order
    pub fn rules(&self) -> impl Iterator<Item = &RuleDescriptor<C>> {
        self.rules.values()
    }

    /// All constraints in registration order
    pub fn constraints(&self) -> impl Iterator<Item = &ConstraintDescriptor<C>> {
        self.constraints.values()
    }

    pub fn module_names(&self) -> &[String] {
        &self.modules
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.constraints.is_empty()
    }

    pub(crate) fn select_rules<'a>(
        &'a self,
        ids: Option<&'a [String]>,
    ) -> Selection<'a, RuleDescriptor<C>> {
        select(&self.rules, ids)
    }

    pub(crate) fn select_constraints<'a>(
        &'a self,
        ids: Option<&'a [String]>,
    ) -> Selection<'a, ConstraintDescriptor<C>> {
        select(&self.constraints, ids)
    }
}

impl<C> Default for Registry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for Registry<C> {
    fn clone(&self) -> Self {
        Self {
            rules: self.rules.clone(),
            constraints: self.constraints.clone(),
            modules: self.modules.clone(),
        }
    }
}

impl<C> std::fmt::Debug for Registry<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("rules", &self.rule_ids())
            .field("constraints", &self.constraint_ids())
            .field("modules", &self.modules)
            .finish()
    }
}

fn merge_meta(target: &mut Meta, shared: &Meta, module: &str) {
    for (key, value) in shared {
        target.entry(key.clone()).or_insert_with(|| value.clone());
    }
    target
        .entry("module".to_string())
        .or_insert_with(|| Value::String(module.to_string()));
}

fn select<'a, D>(entries: &'a IndexMap<String, D>, ids: Option<&'a [String]>) -> Selection<'a, D> {
    let Some(ids) = ids else {
        return Selection {
            entries: entries.values().collect(),
            missing: Vec::new(),
        };
    };

    let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
    let selected = entries
        .iter()
        .filter(|(id, _)| wanted.contains(id.as_str()))
        .map(|(_, entry)| entry)
        .collect();

    let mut seen = HashSet::new();
    let missing = ids
        .iter()
        .map(String::as_str)
        .filter(|id| !entries.contains_key(*id) && seen.insert(*id))
        .collect();

    Selection {
        entries: selected,
        missing,
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
