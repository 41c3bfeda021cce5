// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runner configuration
//!
//! The engine settings sit at the top level, next to a `[counter]` table:
//!
//! ```toml
//! protocol_version = "1"
//!
//! [logging]
//! filter = "rf_engine=debug,info"
//!
//! [counter]
//! max = 100
//! ```

use rf_core::{ConfigError, EngineConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_MAX: i64 = 100;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    #[serde(flatten)]
    pub engine: EngineConfig,
    pub counter: CounterConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    /// Largest count the `max` constraint accepts
    pub max: i64,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self { max: DEFAULT_MAX }
    }
}

impl RunnerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
