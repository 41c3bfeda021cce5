// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for registry setup

use thiserror::Error;

/// Setup-time failures; these indicate programmer error and are not diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("duplicate rule id: {0}")]
    DuplicateRule(String),
    #[error("duplicate constraint id: {0}")]
    DuplicateConstraint(String),
    #[error("duplicate module name: {0}")]
    DuplicateModule(String),
}
