// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::actor::Actor;
use crate::handle::EngineHandle;
use async_trait::async_trait;
use rf_core::BoxError;
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};

/// Logs every state change it receives
pub struct LoggingActor {
    id: String,
    seen: AtomicU64,
}

impl LoggingActor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            seen: AtomicU64::new(0),
        }
    }

    /// State changes received so far
    pub fn seen(&self) -> u64 {
        self.seen.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<E> Actor<E> for LoggingActor
where
    E: EngineHandle,
    E::State: Debug,
{
    fn id(&self) -> &str {
        &self.id
    }

    fn description(&self) -> &str {
        "logs engine state changes"
    }

    async fn on_start(&self, _engine: &E) -> Result<(), BoxError> {
        tracing::info!(actor = %self.id, "logging state changes");
        Ok(())
    }

    fn on_state_change(&self, state: &E::State, _engine: &E) {
        let seen = self.seen.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(actor = %self.id, seen, "state changed");
        tracing::debug!(actor = %self.id, ?state, "current state");
    }
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
