// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Actor lifecycle management
//!
//! Each actor moves through `Registered -> Starting -> Active` and back to
//! `Registered` when stopped. Only active actors receive state changes.
//! The internal lock is never held across an `await`, so hooks may take
//! as long as they like without blocking notifications to other actors.

use crate::actor::Actor;
use crate::error::{ActorError, Hook};
use crate::handle::{Dispatch, EngineHandle};
use indexmap::IndexMap;
use rf_core::{isolate_unit, Event};
use std::sync::{Arc, Mutex, MutexGuard};

/// Lifecycle status of a registered actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorStatus {
    Registered,
    /// `on_start` is running
    Starting,
    Active,
}

struct Entry<E: EngineHandle> {
    actor: Arc<dyn Actor<E>>,
    status: ActorStatus,
}

struct Inner<E: EngineHandle> {
    engine: Option<E>,
    actors: IndexMap<String, Entry<E>>,
}

/// Runs named actors against one attached engine
pub struct ActorManager<E: EngineHandle> {
    inner: Arc<Mutex<Inner<E>>>,
}

impl<E: EngineHandle> ActorManager<E> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                engine: None,
                actors: IndexMap::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<E>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn register(&self, actor: impl Actor<E> + 'static) -> Result<(), ActorError> {
        self.register_shared(Arc::new(actor))
    }

    /// Register an actor the caller keeps a handle to
    pub fn register_shared(&self, actor: Arc<dyn Actor<E>>) -> Result<(), ActorError> {
        let mut inner = self.lock();
        let id = actor.id().to_string();
        if inner.actors.contains_key(&id) {
            return Err(ActorError::DuplicateActor(id));
        }
        tracing::debug!(actor = %id, description = actor.description(), "actor registered");
        inner.actors.insert(
            id,
            Entry {
                actor,
                status: ActorStatus::Registered,
            },
        );
        Ok(())
    }

    /// Attach the engine handed to `on_start` and `on_state_change`
    pub fn attach_engine(&self, engine: E) {
        self.lock().engine = Some(engine);
    }

    pub fn engine(&self) -> Option<E> {
        self.lock().engine.clone()
    }

    pub fn status(&self, id: &str) -> Option<ActorStatus> {
        self.lock().actors.get(id).map(|entry| entry.status)
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.status(id) == Some(ActorStatus::Active)
    }

    /// Registered ids in registration order
    pub fn actor_ids(&self) -> Vec<String> {
        self.lock().actors.keys().cloned().collect()
    }

    /// Active ids in registration order
    pub fn active_ids(&self) -> Vec<String> {
        self.ids_with(ActorStatus::Active)
    }

    fn ids_with(&self, status: ActorStatus) -> Vec<String> {
        self.lock()
            .actors
            .iter()
            .filter(|(_, entry)| entry.status == status)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Run the actor's `on_start` and mark it active
    pub async fn start(&self, id: &str) -> Result<(), ActorError> {
        let (actor, engine) = {
            let mut inner = self.lock();
            let engine = inner.engine.clone().ok_or(ActorError::NotAttached)?;
            let entry = inner
                .actors
                .get_mut(id)
                .ok_or_else(|| ActorError::UnknownActor(id.to_string()))?;
            if entry.status != ActorStatus::Registered {
                return Err(ActorError::AlreadyStarted(id.to_string()));
            }
            entry.status = ActorStatus::Starting;
            (Arc::clone(&entry.actor), engine)
        };

        // Puts the actor back to `Registered` if `on_start` fails, panics,
        // or the start future is dropped
        let guard = StartGuard {
            inner: &self.inner,
            id,
            armed: true,
        };

        tracing::info!(actor = id, "starting actor");
        match actor.on_start(&engine).await {
            Ok(()) => {
                guard.finish(ActorStatus::Active);
                tracing::info!(actor = id, "actor started");
                Ok(())
            }
            Err(e) => {
                guard.finish(ActorStatus::Registered);
                tracing::warn!(actor = id, error = %e, "actor failed to start");
                Err(ActorError::Hook {
                    id: id.to_string(),
                    hook: Hook::Start,
                    message: e.to_string(),
                })
            }
        }
    }

    /// Remove the actor from the active set and run its `on_stop`
    ///
    /// The actor stops receiving state changes before `on_stop` runs, and
    /// stays stopped even if `on_stop` fails.
    pub async fn stop(&self, id: &str) -> Result<(), ActorError> {
        let actor = {
            let mut inner = self.lock();
            let entry = inner
                .actors
                .get_mut(id)
                .ok_or_else(|| ActorError::UnknownActor(id.to_string()))?;
            if entry.status != ActorStatus::Active {
                return Err(ActorError::NotStarted(id.to_string()));
            }
            entry.status = ActorStatus::Registered;
            Arc::clone(&entry.actor)
        };

        tracing::info!(actor = id, "stopping actor");
        actor.on_stop().await.map_err(|e| {
            tracing::warn!(actor = id, error = %e, "actor failed to stop cleanly");
            ActorError::Hook {
                id: id.to_string(),
                hook: Hook::Stop,
                message: e.to_string(),
            }
        })?;
        tracing::info!(actor = id, "actor stopped");
        Ok(())
    }

    /// Start every stopped actor in registration order
    ///
    /// Stops at the first failure; actors started before it stay active.
    pub async fn start_all(&self) -> Result<(), ActorError> {
        if self.lock().engine.is_none() {
            return Err(ActorError::NotAttached);
        }
        for id in self.ids_with(ActorStatus::Registered) {
            self.start(&id).await?;
        }
        Ok(())
    }

    /// Stop every active actor in reverse registration order
    ///
    /// Every actor is stopped even when an earlier one fails; the first
    /// failure is returned.
    pub async fn stop_all(&self) -> Result<(), ActorError> {
        let mut first_error = None;
        for id in self.active_ids().into_iter().rev() {
            if let Err(e) = self.stop(&id).await {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Deliver `state` to every active actor
    ///
    /// A panicking `on_state_change` is logged and the remaining actors are
    /// still notified.
    pub fn notify_state_change(&self, state: &E::State) {
        let (engine, active) = {
            let inner = self.lock();
            let Some(engine) = inner.engine.clone() else {
                return;
            };
            let active: Vec<_> = inner
                .actors
                .values()
                .filter(|entry| entry.status == ActorStatus::Active)
                .map(|entry| Arc::clone(&entry.actor))
                .collect();
            (engine, active)
        };

        for actor in active {
            if let Err(failure) = isolate_unit(|| actor.on_state_change(state, &engine)) {
                tracing::error!(actor = actor.id(), error = %failure, "state change handler failed");
            }
        }
    }
}

impl<E: Dispatch> ActorManager<E> {
    /// Dispatch `events` to the attached engine, then notify active actors
    pub fn dispatch(&self, events: &[Event]) -> Result<E::Outcome, ActorError> {
        let engine = self.engine().ok_or(ActorError::NotAttached)?;
        let outcome = engine.dispatch(events);
        self.notify_state_change(&engine.snapshot());
        Ok(outcome)
    }
}

impl<E: EngineHandle> Default for ActorManager<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EngineHandle> Clone for ActorManager<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: EngineHandle> std::fmt::Debug for ActorManager<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        let statuses: Vec<_> = inner
            .actors
            .iter()
            .map(|(id, entry)| (id.as_str(), entry.status))
            .collect();
        f.debug_struct("ActorManager")
            .field("attached", &inner.engine.is_some())
            .field("actors", &statuses)
            .finish()
    }
}

struct StartGuard<'a, E: EngineHandle> {
    inner: &'a Mutex<Inner<E>>,
    id: &'a str,
    armed: bool,
}

impl<E: EngineHandle> StartGuard<'_, E> {
    fn finish(mut self, status: ActorStatus) {
        self.set(status);
        self.armed = false;
    }

    fn set(&self, status: ActorStatus) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = inner.actors.get_mut(self.id) {
            if entry.status == ActorStatus::Starting {
                entry.status = status;
            }
        }
    }
}

impl<E: EngineHandle> Drop for StartGuard<'_, E> {
    fn drop(&mut self) {
        if self.armed {
            self.set(ActorStatus::Registered);
        }
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
