// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rf-core: shared protocol types for the rule engine
//!
//! This crate provides:
//! - `Event` and `Fact` records with opaque JSON payloads
//! - `Diagnostic` reports for rule and constraint failures
//! - `EngineState`, the `{context, facts, meta}` shape both engines share
//! - Clock abstraction, TOML configuration, and failure isolation for user code

pub mod clock;
pub mod config;
pub mod diagnostic;
pub mod isolate;
pub mod record;
pub mod state;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{ConfigError, EngineConfig, LoggingConfig};
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use isolate::{isolate, isolate_unit, BoxError, Failure};
pub use record::{Event, Fact};
pub use state::{EngineState, Meta};
