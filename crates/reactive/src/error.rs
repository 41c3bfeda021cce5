// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// A proxy write that does not fit the shape of the value it targets
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProxyError {
    #[error("{path} is not an object")]
    NotAnObject { path: String },
    #[error("{path} is not an array")]
    NotAnArray { path: String },
    #[error("index {index} out of bounds for {path} (len {len})")]
    IndexOutOfBounds {
        path: String,
        index: usize,
        len: usize,
    },
}
