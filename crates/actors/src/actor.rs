// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::handle::EngineHandle;
use async_trait::async_trait;
use rf_core::BoxError;

/// A named side-effect unit with an explicit lifecycle
///
/// Hooks default to no-ops. `on_state_change` is only called while the
/// actor is active, that is after `on_start` succeeded and before `stop`.
#[async_trait]
pub trait Actor<E: EngineHandle>: Send + Sync {
    fn id(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    async fn on_start(&self, _engine: &E) -> Result<(), BoxError> {
        Ok(())
    }

    async fn on_stop(&self) -> Result<(), BoxError> {
        Ok(())
    }

    fn on_state_change(&self, _state: &E::State, _engine: &E) {}
}
