// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bridge from a discrete engine to a reactive store
//!
//! UI layers bind to a `ReactiveEngine`; the mirror keeps it in line with a
//! discrete engine's state. Contexts are reconciled rather than replaced, so
//! reactive subscribers only hear about values that actually moved.

use crate::actor::Actor;
use async_trait::async_trait;
use rf_core::{BoxError, Clock, EngineState};
use rf_engine::SharedEngine;
use rf_reactive::{Draft, ReactiveEngine};
use serde::Serialize;

pub struct ReactiveMirror {
    id: String,
    target: ReactiveEngine,
}

impl ReactiveMirror {
    pub fn new(id: impl Into<String>, target: ReactiveEngine) -> Self {
        Self {
            id: id.into(),
            target,
        }
    }

    pub fn target(&self) -> &ReactiveEngine {
        &self.target
    }

    /// Copy `state` into the reactive store; returns whether anything changed
    pub fn mirror<C: Serialize>(&self, state: &EngineState<C>) -> Result<bool, serde_json::Error> {
        let context = serde_json::to_value(&state.context)?;
        let changed = self.target.apply(|draft| {
            let mut writes = draft.context().reconcile(context);
            writes += sync_meta(draft, state);
            writes += sync_facts(draft, state);
            writes > 0
        });
        Ok(changed)
    }
}

fn sync_meta<C>(draft: &mut Draft<'_>, state: &EngineState<C>) -> usize {
    let stale: Vec<String> = draft
        .state()
        .meta
        .keys()
        .filter(|key| !state.meta.contains_key(*key))
        .cloned()
        .collect();
    let mut writes = 0;
    for key in stale {
        draft.meta().remove(&key);
        writes += 1;
    }
    for (key, value) in &state.meta {
        if draft.state().meta.get(key) != Some(value) && draft.meta().set(key, value.clone()) {
            writes += 1;
        }
    }
    writes
}

fn sync_facts<C>(draft: &mut Draft<'_>, state: &EngineState<C>) -> usize {
    if draft.state().facts == state.facts {
        return 0;
    }
    let mut facts = draft.facts();
    facts.clear();
    for fact in &state.facts {
        facts.push(fact.clone());
    }
    1
}

#[async_trait]
impl<C, K> Actor<SharedEngine<C, K>> for ReactiveMirror
where
    C: Clone + Serialize + Send + Sync + 'static,
    K: Clock,
{
    fn id(&self) -> &str {
        &self.id
    }

    fn description(&self) -> &str {
        "mirrors engine state into a reactive store"
    }

    async fn on_start(&self, engine: &SharedEngine<C, K>) -> Result<(), BoxError> {
        self.mirror(&engine.get_state())?;
        Ok(())
    }

    fn on_state_change(&self, state: &EngineState<C>, _engine: &SharedEngine<C, K>) {
        match self.mirror(state) {
            Ok(changed) => tracing::trace!(actor = %self.id, changed, "mirrored state"),
            Err(e) => tracing::warn!(actor = %self.id, error = %e, "failed to mirror state"),
        }
    }
}

#[cfg(test)]
#[path = "mirror_tests.rs"]
mod tests;
