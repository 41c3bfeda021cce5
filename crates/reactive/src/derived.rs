// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Memoized projections of reactive state
//!
//! A derived value with subscribers is recomputed after every changing
//! `apply`, and its subscribers hear about it only when the result differs
//! from the previous one. Without subscribers it is only marked stale and
//! recomputed on the next `get`. Each result is tagged with the revision
//! it was computed from, and results from older revisions are discarded.

use crate::draft::ReactiveState;
use crate::engine::ReactiveEngine;
use crate::subscription::Subscription;
use rf_core::{isolate, isolate_unit};
use std::sync::{Arc, Mutex, MutexGuard};

type Selector<T> = Box<dyn Fn(&ReactiveState) -> T + Send + Sync>;
type DerivedCallback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Engine-side view of a derived value, independent of its result type
pub(crate) trait DerivedNode: Send + Sync {
    fn refresh(&self, state: &ReactiveState, revision: u64);
}

struct Slot<T> {
    value: T,
    revision: u64,
    stale: bool,
    next_id: u64,
    subscribers: Vec<(u64, DerivedCallback<T>)>,
}

pub(crate) struct DerivedCell<T> {
    selector: Selector<T>,
    slot: Mutex<Slot<T>>,
}

impl<T> DerivedCell<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub(crate) fn new(selector: Selector<T>, initial: T, revision: u64) -> Self {
        Self {
            selector,
            slot: Mutex::new(Slot {
                value: initial,
                revision,
                stale: false,
                next_id: 0,
                subscribers: Vec::new(),
            }),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run the selector; a panic is logged and yields `None`
    fn compute(&self, state: &ReactiveState) -> Option<T> {
        match isolate(|| Ok((self.selector)(state))) {
            Ok(value) => Some(value),
            Err(failure) => {
                tracing::error!(error = %failure, "derived selector failed");
                None
            }
        }
    }

    /// Store `next` and return the subscribers to notify when it differs
    fn store(&self, next: T, revision: u64) -> Option<Vec<DerivedCallback<T>>> {
        let mut slot = self.slot();
        if revision < slot.revision {
            return None;
        }
        slot.revision = revision;
        slot.stale = false;
        if slot.value == next {
            return None;
        }
        slot.value = next;
        Some(
            slot.subscribers
                .iter()
                .map(|(_, callback)| Arc::clone(callback))
                .collect(),
        )
    }

    fn store_and_notify(&self, next: T, revision: u64) {
        if let Some(callbacks) = self.store(next.clone(), revision) {
            for callback in &callbacks {
                notify(callback, &next);
            }
        }
    }
}

impl<T> DerivedNode for DerivedCell<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn refresh(&self, state: &ReactiveState, revision: u64) {
        {
            let mut slot = self.slot();
            if revision <= slot.revision {
                return;
            }
            if slot.subscribers.is_empty() {
                slot.stale = true;
                return;
            }
        }
        if let Some(next) = self.compute(state) {
            self.store_and_notify(next, revision);
        }
    }
}

/// Handle to a memoized projection created by [`ReactiveEngine::derived`]
pub struct Derived<T> {
    cell: Arc<DerivedCell<T>>,
    engine: ReactiveEngine,
}

impl<T> Derived<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub(crate) fn new(cell: Arc<DerivedCell<T>>, engine: ReactiveEngine) -> Self {
        Self { cell, engine }
    }

    /// Current result, recomputed first when stale
    pub fn get(&self) -> T {
        let stale = self.cell.slot().stale;
        if stale {
            let computed = self
                .engine
                .read_at(|state, revision| Some((self.cell.compute(state)?, revision)));
            if let Some((next, revision)) = computed {
                self.cell.store_and_notify(next, revision);
            }
        }
        self.cell.slot().value.clone()
    }

    /// Register `callback`, invoking it right away with the current result
    pub fn subscribe(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let current = self.get();
        let callback: DerivedCallback<T> = Arc::new(callback);
        let id = {
            let mut slot = self.cell.slot();
            let id = slot.next_id;
            slot.next_id += 1;
            slot.subscribers.push((id, Arc::clone(&callback)));
            id
        };

        notify(&callback, &current);

        let weak = Arc::downgrade(&self.cell);
        Subscription::new(move || {
            if let Some(cell) = weak.upgrade() {
                cell.slot().subscribers.retain(|(sid, _)| *sid != id);
            }
        })
    }

    pub fn subscriber_count(&self) -> usize {
        self.cell.slot().subscribers.len()
    }

    pub fn is_stale(&self) -> bool {
        self.cell.slot().stale
    }
}

impl<T> Clone for Derived<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
            engine: self.engine.clone(),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Derived<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slot = self.cell.slot.lock().unwrap_or_else(|e| e.into_inner());
        f.debug_struct("Derived")
            .field("value", &slot.value)
            .field("stale", &slot.stale)
            .finish()
    }
}

fn notify<T>(callback: &DerivedCallback<T>, value: &T) {
    if let Err(failure) = isolate_unit(|| callback(value)) {
        tracing::error!(error = %failure, "derived subscriber failed");
    }
}

#[cfg(test)]
#[path = "derived_tests.rs"]
mod tests;
