// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! rf-actors: lifecycle-managed side effects attached to an engine

mod actor;
mod error;
mod handle;
mod logging;
mod manager;
mod mirror;
mod timer;

#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use actor::Actor;
pub use error::{ActorError, Hook};
pub use handle::{Dispatch, EngineHandle};
pub use logging::LoggingActor;
pub use manager::{ActorManager, ActorStatus};
pub use mirror::ReactiveMirror;
pub use timer::TimerActor;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use fake::{ActorCall, RecordingActor};
