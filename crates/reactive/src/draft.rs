// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Change-tracking views over reactive state
//!
//! A [`Draft`] is handed to the mutator of `ReactiveEngine::apply`. Every
//! write goes through a proxy, which records the touched slice and path in
//! a [`ChangeSet`]. The engine notifies subscribers only when that set is
//! non-empty once the mutator returns.

use crate::error::ProxyError;
use rf_core::{EngineState, Fact, Meta};
use serde_json::{Map, Number, Value};
use std::collections::BTreeSet;

/// Reactive state: a JSON context plus facts and meta
pub type ReactiveState = EngineState<Value>;

/// Top-level slice of the state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slice {
    Context,
    Facts,
    Meta,
}

impl Slice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Slice::Context => "context",
            Slice::Facts => "facts",
            Slice::Meta => "meta",
        }
    }
}

/// Writes recorded during one `apply`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    slices: BTreeSet<Slice>,
    paths: Vec<String>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    pub fn touched(&self, slice: Slice) -> bool {
        self.slices.contains(&slice)
    }

    pub fn slices(&self) -> impl Iterator<Item = Slice> + '_ {
        self.slices.iter().copied()
    }

    /// Written paths in first-write order, e.g. `context.items[2].name`
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    fn record(&mut self, slice: Slice, path: String) {
        self.slices.insert(slice);
        if !self.paths.contains(&path) {
            self.paths.push(path);
        }
    }
}

/// Whether writing `next` over `current` leaves the value unchanged
///
/// Scalars compare by value, and numbers by numeric value regardless of
/// integer or float representation (`1` and `1.0` are the same, `0` and
/// `-0.0` are not). Objects and arrays are always treated as new values,
/// even when their contents are equal.
pub fn same_value(current: &Value, next: &Value) -> bool {
    match (current, next) {
        (Value::Array(_) | Value::Object(_), _) | (_, Value::Array(_) | Value::Object(_)) => false,
        (Value::Number(current), Value::Number(next)) => same_number(current, next),
        (current, next) => current == next,
    }
}

fn same_number(current: &Number, next: &Number) -> bool {
    if current.is_f64() || next.is_f64() {
        current.as_f64().map(f64::to_bits) == next.as_f64().map(f64::to_bits)
    } else {
        current == next
    }
}

/// Mutable view of the whole state for the duration of one `apply`
pub struct Draft<'a> {
    state: &'a mut ReactiveState,
    changes: &'a mut ChangeSet,
}

impl<'a> Draft<'a> {
    pub(crate) fn new(state: &'a mut ReactiveState, changes: &'a mut ChangeSet) -> Self {
        Self { state, changes }
    }

    /// Read-only view of the current state, including writes made so far
    pub fn state(&self) -> &ReactiveState {
        &*self.state
    }

    pub fn context(&mut self) -> Proxy<'_> {
        Proxy {
            value: &mut self.state.context,
            path: Slice::Context.as_str().to_string(),
            slice: Slice::Context,
            changes: &mut *self.changes,
        }
    }

    pub fn meta(&mut self) -> MetaProxy<'_> {
        MetaProxy {
            meta: &mut self.state.meta,
            changes: &mut *self.changes,
        }
    }

    pub fn facts(&mut self) -> FactsProxy<'_> {
        FactsProxy {
            facts: &mut self.state.facts,
            changes: &mut *self.changes,
        }
    }

    pub fn changes(&self) -> &ChangeSet {
        &*self.changes
    }
}

/// Tracked handle to one JSON value inside the context
pub struct Proxy<'a> {
    value: &'a mut Value,
    path: String,
    slice: Slice,
    changes: &'a mut ChangeSet,
}

impl<'a> Proxy<'a> {
    pub fn value(&self) -> &Value {
        &*self.value
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.value.get(key)
    }

    /// Proxy for an existing object member
    pub fn at(&mut self, key: &str) -> Option<Proxy<'_>> {
        let path = member_path(&self.path, key);
        let value = self.value.as_object_mut()?.get_mut(key)?;
        Some(Proxy {
            value,
            path,
            slice: self.slice,
            changes: &mut *self.changes,
        })
    }

    /// Proxy for an existing array element
    pub fn index(&mut self, index: usize) -> Option<Proxy<'_>> {
        let path = index_path(&self.path, index);
        let value = self.value.as_array_mut()?.get_mut(index)?;
        Some(Proxy {
            value,
            path,
            slice: self.slice,
            changes: &mut *self.changes,
        })
    }

    /// Proxy for an object member, inserting an empty object when absent
    pub fn entry(&mut self, key: &str) -> Result<Proxy<'_>, ProxyError> {
        let path = member_path(&self.path, key);
        let map = object_mut(self.value, &self.path)?;
        let created = !map.contains_key(key);
        let value = map
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if created {
            self.changes.record(self.slice, path.clone());
        }
        Ok(Proxy {
            value,
            path,
            slice: self.slice,
            changes: &mut *self.changes,
        })
    }

    /// Set an object member; returns whether the state changed
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<bool, ProxyError> {
        let next = value.into();
        let map = object_mut(self.value, &self.path)?;
        if map.get(key).is_some_and(|current| same_value(current, &next)) {
            return Ok(false);
        }
        map.insert(key.to_string(), next);
        self.changes
            .record(self.slice, member_path(&self.path, key));
        Ok(true)
    }

    /// Overwrite an array element; returns whether the state changed
    pub fn set_index(&mut self, index: usize, value: impl Into<Value>) -> Result<bool, ProxyError> {
        let next = value.into();
        let items = array_mut(self.value, &self.path)?;
        let len = items.len();
        let Some(current) = items.get_mut(index) else {
            return Err(ProxyError::IndexOutOfBounds {
                path: self.path.clone(),
                index,
                len,
            });
        };
        if same_value(current, &next) {
            return Ok(false);
        }
        *current = next;
        self.changes
            .record(self.slice, index_path(&self.path, index));
        Ok(true)
    }

    pub fn push(&mut self, value: impl Into<Value>) -> Result<(), ProxyError> {
        array_mut(self.value, &self.path)?.push(value.into());
        self.changes.record(self.slice, self.path.clone());
        Ok(())
    }

    /// Delete an object member, returning its value when it was present
    pub fn remove(&mut self, key: &str) -> Result<Option<Value>, ProxyError> {
        let removed = object_mut(self.value, &self.path)?.remove(key);
        if removed.is_some() {
            self.changes
                .record(self.slice, member_path(&self.path, key));
        }
        Ok(removed)
    }

    /// Replace this value wholesale; returns whether the state changed
    pub fn replace(&mut self, value: impl Into<Value>) -> bool {
        let next = value.into();
        if same_value(self.value, &next) {
            return false;
        }
        *self.value = next;
        self.changes.record(self.slice, self.path.clone());
        true
    }

    /// Bring this value in line with `target`, writing only what differs
    ///
    /// Objects and arrays are walked member by member, so unchanged scalars
    /// are never rewritten. Returns the number of writes performed.
    pub fn reconcile(&mut self, target: Value) -> usize {
        reconcile_value(self.value, target, &self.path, self.slice, self.changes)
    }
}

impl std::fmt::Debug for Proxy<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Proxy")
            .field("path", &self.path)
            .field("value", &self.value)
            .finish()
    }
}

/// Tracked handle to the meta bag
pub struct MetaProxy<'a> {
    meta: &'a mut Meta,
    changes: &'a mut ChangeSet,
}

impl MetaProxy<'_> {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.meta.get(key)
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> bool {
        let next = value.into();
        if self
            .meta
            .get(key)
            .is_some_and(|current| same_value(current, &next))
        {
            return false;
        }
        self.meta.insert(key.to_string(), next);
        self.changes
            .record(Slice::Meta, member_path(Slice::Meta.as_str(), key));
        true
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let removed = self.meta.remove(key);
        if removed.is_some() {
            self.changes
                .record(Slice::Meta, member_path(Slice::Meta.as_str(), key));
        }
        removed
    }
}

/// Tracked handle to the fact list
pub struct FactsProxy<'a> {
    facts: &'a mut Vec<Fact>,
    changes: &'a mut ChangeSet,
}

impl FactsProxy<'_> {
    pub fn push(&mut self, fact: Fact) {
        self.facts.push(fact);
        self.changes
            .record(Slice::Facts, Slice::Facts.as_str().to_string());
    }

    /// Remove every fact; returns how many were removed
    pub fn clear(&mut self) -> usize {
        let removed = self.facts.len();
        if removed > 0 {
            self.facts.clear();
            self.changes
                .record(Slice::Facts, Slice::Facts.as_str().to_string());
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Fact> {
        self.facts.iter()
    }
}

fn member_path(parent: &str, key: &str) -> String {
    format!("{}.{}", parent, key)
}

fn index_path(parent: &str, index: usize) -> String {
    format!("{}[{}]", parent, index)
}

fn object_mut<'v>(value: &'v mut Value, path: &str) -> Result<&'v mut Map<String, Value>, ProxyError> {
    value.as_object_mut().ok_or_else(|| ProxyError::NotAnObject {
        path: path.to_string(),
    })
}

fn array_mut<'v>(value: &'v mut Value, path: &str) -> Result<&'v mut Vec<Value>, ProxyError> {
    value.as_array_mut().ok_or_else(|| ProxyError::NotAnArray {
        path: path.to_string(),
    })
}

fn reconcile_value(
    current: &mut Value,
    target: Value,
    path: &str,
    slice: Slice,
    changes: &mut ChangeSet,
) -> usize {
    match (current, target) {
        (Value::Object(members), Value::Object(incoming)) => {
            let mut writes = 0;
            let stale: Vec<String> = members
                .keys()
                .filter(|key| !incoming.contains_key(key.as_str()))
                .cloned()
                .collect();
            for key in stale {
                members.remove(&key);
                changes.record(slice, member_path(path, &key));
                writes += 1;
            }
            for (key, value) in incoming {
                let child = member_path(path, &key);
                match members.get_mut(&key) {
                    Some(existing) => writes += reconcile_value(existing, value, &child, slice, changes),
                    None => {
                        members.insert(key, value);
                        changes.record(slice, child);
                        writes += 1;
                    }
                }
            }
            writes
        }
        (Value::Array(items), Value::Array(incoming)) => {
            let mut writes = 0;
            if items.len() > incoming.len() {
                items.truncate(incoming.len());
                changes.record(slice, path.to_string());
                writes += 1;
            }
            for (index, value) in incoming.into_iter().enumerate() {
                let child = index_path(path, index);
                match items.get_mut(index) {
                    Some(existing) => writes += reconcile_value(existing, value, &child, slice, changes),
                    None => {
                        items.push(value);
                        changes.record(slice, child);
                        writes += 1;
                    }
                }
            }
            writes
        }
        (current, target) => {
            if same_value(current, &target) {
                return 0;
            }
            *current = target;
            changes.record(slice, path.to_string());
            1
        }
    }
}

#[cfg(test)]
#[path = "draft_tests.rs"]
mod tests;
