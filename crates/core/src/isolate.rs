// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Failure isolation for user-supplied code
//!
//! Rules, constraints, subscribers, and actor hooks are user code. A failure
//! in one of them, whether an `Err` or a panic, is turned into a `Failure`
//! value so the caller can report it and carry on with the next one.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

/// Error type returned by user implementations
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub message: String,
    /// True when the code panicked rather than returning an error
    pub panicked: bool,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.panicked {
            write!(f, "panicked: {}", self.message)
        } else {
            f.write_str(&self.message)
        }
    }
}

impl std::error::Error for Failure {}

/// Run `f`, converting a returned error or a panic into a `Failure`
///
/// State mutated by `f` before it failed is left as it is.
pub fn isolate<T>(f: impl FnOnce() -> Result<T, BoxError>) -> Result<T, Failure> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(Failure {
            message: e.to_string(),
            panicked: false,
        }),
        Err(payload) => Err(Failure {
            message: panic_message(payload.as_ref()),
            panicked: true,
        }),
    }
}

/// Run an infallible callback, converting a panic into a `Failure`
pub fn isolate_unit(f: impl FnOnce()) -> Result<(), Failure> {
    isolate(|| {
        f();
        Ok(())
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
#[path = "isolate_tests.rs"]
mod tests;
