// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cloneable, thread-safe handle to an [`Engine`]

use crate::engine::{Engine, StepConfig, StepResult};
use rf_core::{Clock, EngineState, Event, Meta, SystemClock};
use std::sync::{Arc, Mutex, MutexGuard};

/// Shares one engine between callers
///
/// Steps are serialized by the inner lock, so each step sees the context
/// left by the previous one in full.
pub struct SharedEngine<C, K: Clock = SystemClock> {
    inner: Arc<Mutex<Engine<C, K>>>,
}

impl<C: Clone, K: Clock> SharedEngine<C, K> {
    pub fn new(engine: Engine<C, K>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Engine<C, K>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn step(&self, events: &[Event]) -> StepResult<C> {
        self.lock().step(events)
    }

    pub fn step_with_config(&self, events: &[Event], config: &StepConfig) -> StepResult<C> {
        self.lock().step_with_config(events, config)
    }

    pub fn get_context(&self) -> C {
        self.lock().get_context()
    }

    pub fn get_state(&self) -> EngineState<C> {
        self.lock().get_state()
    }

    pub fn update_context(&self, f: impl FnOnce(&C) -> C) {
        self.lock().update_context(f)
    }

    pub fn get_meta(&self) -> Meta {
        self.lock().get_meta()
    }

    pub fn step_count(&self) -> u64 {
        self.lock().step_count()
    }

    /// Run `f` with exclusive access to the engine
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut Engine<C, K>) -> R) -> R {
        f(&mut self.lock())
    }
}

impl<C, K: Clock> Clone for SharedEngine<C, K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Clone, K: Clock> From<Engine<C, K>> for SharedEngine<C, K> {
    fn from(engine: Engine<C, K>) -> Self {
        Self::new(engine)
    }
}

#[cfg(test)]
#[path = "shared_tests.rs"]
mod tests;
