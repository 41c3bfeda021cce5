// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;
use thiserror::Error;

/// Lifecycle hook that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    Start,
    Stop,
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hook::Start => f.write_str("on_start"),
            Hook::Stop => f.write_str("on_stop"),
        }
    }
}

/// Errors from actor registration and lifecycle management
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActorError {
    #[error("duplicate actor id: {0}")]
    DuplicateActor(String),
    #[error("unknown actor: {0}")]
    UnknownActor(String),
    #[error("actor '{0}' already started")]
    AlreadyStarted(String),
    #[error("actor '{0}' not started")]
    NotStarted(String),
    #[error("no engine attached to the actor manager")]
    NotAttached,
    #[error("actor '{id}' {hook} failed: {message}")]
    Hook {
        id: String,
        hook: Hook,
        message: String,
    },
}
