// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Diagnostics reported by a step
//!
//! Rule and constraint failures are data returned alongside the step result,
//! never errors raised out of the engine.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// A rule failed, or a requested rule id is not registered
    RuleError,
    /// A constraint rejected the state, failed, or is not registered
    ConstraintViolation,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::RuleError => "rule-error",
            DiagnosticKind::ConstraintViolation => "constraint-violation",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    /// Id of the rule or constraint that produced this diagnostic
    pub source_id: String,
}

impl Diagnostic {
    pub fn rule_error(source_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::RuleError,
            message: message.into(),
            source_id: source_id.into(),
        }
    }

    pub fn constraint_violation(source_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::ConstraintViolation,
            message: message.into(),
            source_id: source_id.into(),
        }
    }

    pub fn is_rule_error(&self) -> bool {
        self.kind == DiagnosticKind::RuleError
    }

    pub fn is_constraint_violation(&self) -> bool {
        self.kind == DiagnosticKind::ConstraintViolation
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.kind, self.source_id, self.message)
    }
}

#[cfg(test)]
#[path = "diagnostic_tests.rs"]
mod tests;
