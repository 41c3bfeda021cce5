// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rf-engine: rule registry and discrete step engine

mod engine;
mod error;
mod module;
mod registry;
mod rule;
mod shared;

pub use engine::{meta_keys, Engine, StepConfig, StepResult, StepState};
pub use error::RegistryError;
pub use module::Module;
pub use registry::Registry;
pub use rule::{Check, ConstraintDescriptor, ConstraintFn, RuleDescriptor, RuleFn};
pub use shared::SharedEngine;
