// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine handles that actors can be attached to

use rf_core::{Clock, EngineState, Event};
use rf_engine::{SharedEngine, StepResult};
use rf_reactive::{ReactiveEngine, ReactiveState};

/// A cloneable handle to an engine whose state actors observe
pub trait EngineHandle: Clone + Send + Sync + 'static {
    type State: Clone + Send + Sync + 'static;

    /// Copy of the current engine state
    fn snapshot(&self) -> Self::State;
}

/// An engine that accepts batches of events
pub trait Dispatch: EngineHandle {
    type Outcome: Send + 'static;

    fn dispatch(&self, events: &[Event]) -> Self::Outcome;
}

impl<C, K> EngineHandle for SharedEngine<C, K>
where
    C: Clone + Send + Sync + 'static,
    K: Clock,
{
    type State = EngineState<C>;

    fn snapshot(&self) -> Self::State {
        self.get_state()
    }
}

impl<C, K> Dispatch for SharedEngine<C, K>
where
    C: Clone + Send + Sync + 'static,
    K: Clock,
{
    type Outcome = StepResult<C>;

    /// Run one step with `events`
    fn dispatch(&self, events: &[Event]) -> Self::Outcome {
        self.step(events)
    }
}

impl EngineHandle for ReactiveEngine {
    type State = ReactiveState;

    fn snapshot(&self) -> Self::State {
        self.state()
    }
}
