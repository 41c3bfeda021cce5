// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recording actor for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use crate::actor::Actor;
use crate::handle::EngineHandle;
use async_trait::async_trait;
use rf_core::BoxError;
use std::sync::{Arc, Mutex};

/// Recorded lifecycle call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActorCall {
    Start,
    Stop,
    StateChange,
}

#[derive(Default)]
struct FakeState {
    calls: Vec<ActorCall>,
    fail_start: Option<String>,
    fail_stop: Option<String>,
    panic_on_change: bool,
}

/// Fake actor that records every hook call
///
/// Clones share the same record, so a test can keep one clone and register
/// another.
#[derive(Clone)]
pub struct RecordingActor {
    id: String,
    state: Arc<Mutex<FakeState>>,
}

impl RecordingActor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: Arc::new(Mutex::new(FakeState::default())),
        }
    }

    /// Make `on_start` fail with `message`
    pub fn failing_start(self, message: impl Into<String>) -> Self {
        self.lock().fail_start = Some(message.into());
        self
    }

    /// Make `on_stop` fail with `message`
    pub fn failing_stop(self, message: impl Into<String>) -> Self {
        self.lock().fail_stop = Some(message.into());
        self
    }

    /// Make `on_state_change` panic
    pub fn panicking(self) -> Self {
        self.lock().panic_on_change = true;
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn calls(&self) -> Vec<ActorCall> {
        self.lock().calls.clone()
    }

    /// Record `call`, returning the configured failure for it
    fn record(&self, call: ActorCall) -> Option<String> {
        let mut state = self.lock();
        let failure = match call {
            ActorCall::Start => state.fail_start.clone(),
            ActorCall::Stop => state.fail_stop.clone(),
            ActorCall::StateChange => None,
        };
        state.calls.push(call);
        failure
    }

    pub fn state_changes(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| **call == ActorCall::StateChange)
            .count()
    }
}

#[async_trait]
impl<E: EngineHandle> Actor<E> for RecordingActor {
    fn id(&self) -> &str {
        &self.id
    }

    fn description(&self) -> &str {
        "records lifecycle calls"
    }

    async fn on_start(&self, _engine: &E) -> Result<(), BoxError> {
        match self.record(ActorCall::Start) {
            Some(message) => Err(message.into()),
            None => Ok(()),
        }
    }

    async fn on_stop(&self) -> Result<(), BoxError> {
        match self.record(ActorCall::Stop) {
            Some(message) => Err(message.into()),
            None => Ok(()),
        }
    }

    #[allow(clippy::panic)]
    fn on_state_change(&self, _state: &E::State, _engine: &E) {
        let panics = {
            let mut state = self.lock();
            state.calls.push(ActorCall::StateChange);
            state.panic_on_change
        };
        if panics {
            panic!("{} cannot handle state changes", self.id);
        }
    }
}
