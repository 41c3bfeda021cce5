// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `{context, facts, meta}` state shape shared by both engines

use crate::record::Fact;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Open key/value bag for engine-level annotations
pub type Meta = BTreeMap<String, Value>;

/// Engine state: the persistent context, the facts of the latest step, and meta
///
/// Copies handed to callers are made with `Clone`. Owned data is deep-copied;
/// members kept behind `Arc` (closures, timer handles, channels) are shared by
/// reference, so taking a snapshot never fails.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EngineState<C> {
    pub context: C,
    #[serde(default)]
    pub facts: Vec<Fact>,
    #[serde(default)]
    pub meta: Meta,
}

impl<C> EngineState<C> {
    pub fn new(context: C) -> Self {
        Self {
            context,
            facts: Vec::new(),
            meta: Meta::new(),
        }
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Facts with the given tag, in emission order
    pub fn facts_tagged<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Fact> + 'a {
        self.facts.iter().filter(move |f| f.is(tag))
    }
}
