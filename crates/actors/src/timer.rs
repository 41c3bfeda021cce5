// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Interval-driven event source

use crate::actor::Actor;
use crate::handle::Dispatch;
use async_trait::async_trait;
use rf_core::{isolate, BoxError, Event};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

type Generator = dyn Fn(u64) -> Vec<Event> + Send + Sync;

/// Dispatches generated events to the engine at a fixed interval
///
/// The generator receives the 1-based tick number. Ticks that generate no
/// events dispatch nothing. Once `on_stop` resolves the interval task has
/// finished, so no further dispatch can happen.
pub struct TimerActor {
    id: String,
    period: Duration,
    generator: Arc<Generator>,
    ticks: Arc<AtomicU64>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl TimerActor {
    /// `period` is clamped to at least one millisecond
    pub fn new<F>(id: impl Into<String>, period: Duration, generator: F) -> Self
    where
        F: Fn(u64) -> Vec<Event> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            period: period.max(Duration::from_millis(1)),
            generator: Arc::new(generator),
            ticks: Arc::new(AtomicU64::new(0)),
            task: Mutex::new(None),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Ticks elapsed across all runs
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.lock_task().as_ref().is_some_and(|task| !task.is_finished())
    }

    fn lock_task(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.task.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl<E: Dispatch> Actor<E> for TimerActor {
    fn id(&self) -> &str {
        &self.id
    }

    fn description(&self) -> &str {
        "dispatches generated events at a fixed interval"
    }

    async fn on_start(&self, engine: &E) -> Result<(), BoxError> {
        let engine = engine.clone();
        let generator = Arc::clone(&self.generator);
        let ticks = Arc::clone(&self.ticks);
        let period = self.period;
        let id = self.id.clone();

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let tick = ticks.fetch_add(1, Ordering::SeqCst) + 1;
                let events = match isolate(|| Ok(generator(tick))) {
                    Ok(events) => events,
                    Err(failure) => {
                        tracing::error!(actor = %id, tick, error = %failure, "event generator failed");
                        continue;
                    }
                };
                if events.is_empty() {
                    continue;
                }
                tracing::debug!(actor = %id, tick, events = events.len(), "timer dispatch");
                engine.dispatch(&events);
            }
        });

        if let Some(previous) = self.lock_task().replace(task) {
            previous.abort();
        }
        Ok(())
    }

    async fn on_stop(&self) -> Result<(), BoxError> {
        let task = self.lock_task().take();
        if let Some(task) = task {
            task.abort();
            // Resolves once the task is gone; a cancelled join is expected
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    return Err(e.into());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
