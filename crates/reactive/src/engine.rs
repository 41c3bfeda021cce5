// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Continuously reactive engine over `{context, facts, meta}`
//!
//! All writes go through [`ReactiveEngine::apply`]. Once the mutator
//! returns, every state subscriber is notified at most once, and derived
//! values are refreshed. Callbacks run with the engine lock released.
//!
//! Notifications are delivered one pass at a time, in revision order. An
//! `apply` made while a pass is being delivered (from a callback, or from
//! another thread) queues its notification for the active deliverer.

use crate::derived::{Derived, DerivedCell, DerivedNode};
use crate::draft::{ChangeSet, Draft, ReactiveState};
use crate::subscription::Subscription;
use rf_core::{isolate, isolate_unit, EngineConfig, Failure};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

type StateCallback = Arc<dyn Fn(&ReactiveState) + Send + Sync>;

struct Inner {
    state: ReactiveState,
    revision: u64,
    next_id: u64,
    subscribers: Vec<(u64, StateCallback)>,
    derived: Vec<Weak<dyn DerivedNode>>,
    pending: VecDeque<Notification>,
    delivering: bool,
}

impl Inner {
    /// Upgrade live derived nodes, dropping those whose handles are gone
    fn live_derived(&mut self) -> Vec<Arc<dyn DerivedNode>> {
        let mut live = Vec::with_capacity(self.derived.len());
        self.derived.retain(|weak| match weak.upgrade() {
            Some(node) => {
                live.push(node);
                true
            }
            None => false,
        });
        live
    }
}

/// Snapshot and recipients of one notification pass
struct Notification {
    revision: u64,
    state: ReactiveState,
    subscribers: Vec<(u64, StateCallback)>,
    derived: Vec<Arc<dyn DerivedNode>>,
}

impl Notification {
    fn deliver(self) {
        for (id, callback) in &self.subscribers {
            notify_subscriber(*id, callback, &self.state);
        }
        for node in &self.derived {
            node.refresh(&self.state, self.revision);
        }
        tracing::trace!(
            revision = self.revision,
            subscribers = self.subscribers.len(),
            derived = self.derived.len(),
            "notification delivered"
        );
    }
}

/// Cloneable handle to a reactive state store
#[derive(Clone)]
pub struct ReactiveEngine {
    inner: Arc<Mutex<Inner>>,
}

impl ReactiveEngine {
    pub fn new(context: Value) -> Self {
        Self::from_state(ReactiveState::new(context))
    }

    pub fn from_state(state: ReactiveState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state,
                revision: 0,
                next_id: 0,
                subscribers: Vec::new(),
                derived: Vec::new(),
                pending: VecDeque::new(),
                delivering: false,
            })),
        }
    }

    /// Build from any serializable context value
    pub fn from_serializable<T: Serialize>(context: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::to_value(context)?))
    }

    /// Build with the configured protocol version recorded in meta
    pub fn with_config(context: Value, config: &EngineConfig) -> Self {
        Self::from_state(
            ReactiveState::new(context)
                .with_meta("protocolVersion", config.protocol_version.clone()),
        )
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run `mutator` against the live state, then notify once if anything changed
    ///
    /// The mutator holds the engine lock: it must use the draft for reads
    /// and must not call back into this engine. When another notification
    /// pass is in progress, this one is queued behind it and `apply`
    /// returns before it is delivered.
    pub fn apply<R>(&self, mutator: impl FnOnce(&mut Draft<'_>) -> R) -> R {
        let mut changes = ChangeSet::default();
        let result = {
            let mut inner = self.lock();
            let result = {
                let mut draft = Draft::new(&mut inner.state, &mut changes);
                mutator(&mut draft)
            };
            if changes.is_empty() {
                return result;
            }

            inner.revision += 1;
            tracing::debug!(
                revision = inner.revision,
                paths = ?changes.paths(),
                "state changed"
            );
            let notification = Notification {
                revision: inner.revision,
                state: inner.state.clone(),
                subscribers: inner.subscribers.clone(),
                derived: inner.live_derived(),
            };
            inner.pending.push_back(notification);
            if inner.delivering {
                tracing::trace!(revision = inner.revision, "notification queued");
                return result;
            }
            inner.delivering = true;
            result
        };

        self.drain();
        result
    }

    /// Deliver queued notifications until none are left
    fn drain(&self) {
        loop {
            let next = {
                let mut inner = self.lock();
                let next = inner.pending.pop_front();
                if next.is_none() {
                    inner.delivering = false;
                }
                next
            };
            match next {
                Some(notification) => notification.deliver(),
                None => return,
            }
        }
    }

    /// Register `callback`, invoking it right away with the current state
    pub fn subscribe(
        &self,
        callback: impl Fn(&ReactiveState) + Send + Sync + 'static,
    ) -> Subscription {
        let callback: StateCallback = Arc::new(callback);
        let (id, state) = {
            let mut inner = self.lock();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.subscribers.push((id, Arc::clone(&callback)));
            (id, inner.state.clone())
        };

        notify_subscriber(id, &callback, &state);

        let weak = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                let mut inner = inner.lock().unwrap_or_else(|e| e.into_inner());
                inner.subscribers.retain(|(sid, _)| *sid != id);
            }
        })
    }

    /// Memoized projection of the state
    ///
    /// The selector runs once now, and a failure of that first run is
    /// returned. Later failures are logged and keep the previous result.
    /// The selector must not call back into this engine.
    pub fn derived<T, F>(&self, selector: F) -> Result<Derived<T>, Failure>
    where
        T: Clone + PartialEq + Send + Sync + 'static,
        F: Fn(&ReactiveState) -> T + Send + Sync + 'static,
    {
        let mut inner = self.lock();
        let initial = isolate(|| Ok(selector(&inner.state)))?;
        let cell = Arc::new(DerivedCell::new(Box::new(selector), initial, inner.revision));
        let node: Weak<dyn DerivedNode> = Arc::downgrade(&cell) as Weak<dyn DerivedNode>;
        inner.derived.push(node);
        drop(inner);

        Ok(Derived::new(cell, self.clone()))
    }

    /// Run `f` against the current state and its revision under the engine lock
    pub(crate) fn read_at<R>(&self, f: impl FnOnce(&ReactiveState, u64) -> R) -> R {
        let inner = self.lock();
        f(&inner.state, inner.revision)
    }

    /// Copy of the whole state
    pub fn state(&self) -> ReactiveState {
        self.lock().state.clone()
    }

    pub fn context(&self) -> Value {
        self.lock().state.context.clone()
    }

    /// Deserialize the context into a typed value
    pub fn context_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        self.read_at(|state, _| T::deserialize(&state.context))
    }

    /// Number of `apply` calls that changed the state
    pub fn revision(&self) -> u64 {
        self.lock().revision
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// Derived values still held by a handle
    pub fn derived_count(&self) -> usize {
        self.lock().live_derived().len()
    }
}

impl Default for ReactiveEngine {
    fn default() -> Self {
        Self::new(Value::Object(serde_json::Map::new()))
    }
}

impl std::fmt::Debug for ReactiveEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("ReactiveEngine")
            .field("revision", &inner.revision)
            .field("subscribers", &inner.subscribers.len())
            .field("state", &inner.state)
            .finish()
    }
}

fn notify_subscriber(id: u64, callback: &StateCallback, state: &ReactiveState) {
    if let Err(failure) = isolate_unit(|| callback(state)) {
        tracing::error!(subscriber = id, error = %failure, "state subscriber failed");
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
