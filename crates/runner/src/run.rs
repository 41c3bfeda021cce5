// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON-lines step loop

use crate::config::RunnerConfig;
use crate::counter::{self, Counter};
use anyhow::{Context, Result};
use rf_actors::{ActorManager, LoggingActor};
use rf_core::{Event, SystemClock};
use rf_engine::{Engine, Registry, SharedEngine};
use serde::Deserialize;
use std::io::{BufRead, Write};

pub type CounterEngine = SharedEngine<Counter>;

/// One input line: a single event or a batch stepped together
#[derive(Deserialize)]
#[serde(untagged)]
enum Line {
    One(Event),
    Batch(Vec<Event>),
}

pub fn parse_line(line: &str) -> Result<Vec<Event>, serde_json::Error> {
    Ok(match serde_json::from_str(line)? {
        Line::One(event) => vec![event],
        Line::Batch(events) => events,
    })
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub steps: u64,
    pub skipped: u64,
}

pub fn build_engine(config: &RunnerConfig, initial: Counter) -> Result<CounterEngine> {
    let mut registry = Registry::new();
    registry
        .register_module(counter::module(config.counter.max))
        .context("failed to register counter module")?;
    Ok(SharedEngine::new(Engine::with_clock(
        registry,
        initial,
        config.engine.clone(),
        SystemClock,
    )))
}

/// Step the engine once per non-empty input line, writing each result as
/// one JSON line to `output`. Malformed lines are reported on `errors` and
/// skipped.
pub async fn run<R, W, E>(
    config: &RunnerConfig,
    initial: Counter,
    input: R,
    mut output: W,
    mut errors: E,
) -> Result<Summary>
where
    R: BufRead,
    W: Write,
    E: Write,
{
    let engine = build_engine(config, initial)?;
    let manager = ActorManager::new();
    manager.attach_engine(engine);
    manager.register(LoggingActor::new("log"))?;
    manager.start_all().await?;

    let mut summary = Summary::default();
    for (index, line) in input.lines().enumerate() {
        let line = line.context("failed to read input")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let events = match parse_line(line) {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!(line = index + 1, error = %e, "skipping malformed input");
                writeln!(errors, "line {}: {}", index + 1, e)?;
                summary.skipped += 1;
                continue;
            }
        };

        let result = manager.dispatch(&events)?;
        serde_json::to_writer(&mut output, &result)?;
        writeln!(output)?;
        output.flush()?;
        summary.steps += 1;
    }

    manager.stop_all().await?;
    tracing::info!(steps = summary.steps, skipped = summary.skipped, "input drained");
    Ok(summary)
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
