// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::fake::{ActorCall, RecordingActor};
use async_trait::async_trait;
use rf_core::{BoxError, EngineState};
use rf_engine::{Engine, Registry, RuleDescriptor, SharedEngine};
use std::time::Duration;
use tokio::sync::oneshot;

type Counter = SharedEngine<i64>;

fn counter_engine() -> Counter {
    let mut registry = Registry::new();
    registry
        .register_rule(RuleDescriptor::new(
            "count",
            "Count events",
            |state: &mut EngineState<i64>, events: &[Event]| {
                state.context += events.len() as i64;
                Ok(Vec::new())
            },
        ))
        .unwrap();
    SharedEngine::new(Engine::new(registry, 0))
}

fn attached() -> ActorManager<Counter> {
    let manager = ActorManager::new();
    manager.attach_engine(counter_engine());
    manager
}

/// Actor that appends its lifecycle calls to a shared log
struct OrderActor {
    id: String,
    log: Arc<Mutex<Vec<String>>>,
    fail_stop: bool,
}

impl OrderActor {
    fn new(id: &str, log: &Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            id: id.to_string(),
            log: Arc::clone(log),
            fail_stop: false,
        }
    }
}

#[async_trait]
impl Actor<Counter> for OrderActor {
    fn id(&self) -> &str {
        &self.id
    }

    async fn on_start(&self, _engine: &Counter) -> Result<(), BoxError> {
        self.log.lock().unwrap().push(format!("start:{}", self.id));
        Ok(())
    }

    async fn on_stop(&self) -> Result<(), BoxError> {
        self.log.lock().unwrap().push(format!("stop:{}", self.id));
        if self.fail_stop {
            return Err(format!("{} refused", self.id).into());
        }
        Ok(())
    }
}

/// Actor whose `on_start` waits until released
struct SlowActor {
    release: Mutex<Option<oneshot::Receiver<()>>>,
    changes: Arc<Mutex<usize>>,
}

#[async_trait]
impl Actor<Counter> for SlowActor {
    fn id(&self) -> &str {
        "slow"
    }

    async fn on_start(&self, _engine: &Counter) -> Result<(), BoxError> {
        let release = self.release.lock().unwrap().take();
        if let Some(release) = release {
            let _ = release.await;
        }
        Ok(())
    }

    fn on_state_change(&self, _state: &EngineState<i64>, _engine: &Counter) {
        *self.changes.lock().unwrap() += 1;
    }
}

#[tokio::test]
async fn duplicate_ids_are_rejected() {
    let manager = attached();
    manager.register(RecordingActor::new("ticker")).unwrap();

    let err = manager.register(RecordingActor::new("ticker")).unwrap_err();

    assert_eq!(err, ActorError::DuplicateActor("ticker".to_string()));
    assert_eq!(manager.actor_ids(), vec!["ticker"]);
}

#[tokio::test]
async fn starting_requires_an_attached_engine() {
    let manager: ActorManager<Counter> = ActorManager::new();
    let actor = RecordingActor::new("ticker");
    manager.register(actor.clone()).unwrap();

    assert_eq!(manager.start("ticker").await, Err(ActorError::NotAttached));
    assert_eq!(manager.start_all().await, Err(ActorError::NotAttached));
    assert!(actor.calls().is_empty());
    assert_eq!(manager.status("ticker"), Some(ActorStatus::Registered));
}

#[tokio::test]
async fn unknown_ids_are_errors() {
    let manager = attached();

    assert_eq!(
        manager.start("ghost").await,
        Err(ActorError::UnknownActor("ghost".to_string()))
    );
    assert_eq!(
        manager.stop("ghost").await,
        Err(ActorError::UnknownActor("ghost".to_string()))
    );
}

#[tokio::test]
async fn starting_twice_fails() {
    let manager = attached();
    let actor = RecordingActor::new("ticker");
    manager.register(actor.clone()).unwrap();

    manager.start("ticker").await.unwrap();
    let err = manager.start("ticker").await.unwrap_err();

    assert_eq!(err, ActorError::AlreadyStarted("ticker".to_string()));
    assert_eq!(err.to_string(), "actor 'ticker' already started");
    assert_eq!(actor.calls(), vec![ActorCall::Start]);
    assert!(manager.is_active("ticker"));
}

#[tokio::test]
async fn stop_then_restart() {
    let manager = attached();
    let actor = RecordingActor::new("ticker");
    manager.register(actor.clone()).unwrap();

    assert_eq!(
        manager.stop("ticker").await,
        Err(ActorError::NotStarted("ticker".to_string()))
    );

    manager.start("ticker").await.unwrap();
    manager.stop("ticker").await.unwrap();
    assert_eq!(manager.status("ticker"), Some(ActorStatus::Registered));

    manager.start("ticker").await.unwrap();
    assert_eq!(
        actor.calls(),
        vec![ActorCall::Start, ActorCall::Stop, ActorCall::Start]
    );
}

#[tokio::test]
async fn only_active_actors_hear_state_changes() {
    let manager = attached();
    let started = RecordingActor::new("started");
    let idle = RecordingActor::new("idle");
    manager.register(started.clone()).unwrap();
    manager.register(idle.clone()).unwrap();
    manager.start("started").await.unwrap();

    let state = EngineState::new(1);
    manager.notify_state_change(&state);
    assert_eq!(started.state_changes(), 1);
    assert_eq!(idle.state_changes(), 0);

    manager.stop("started").await.unwrap();
    manager.notify_state_change(&state);
    assert_eq!(started.state_changes(), 1);
}

#[tokio::test]
async fn failing_start_leaves_the_actor_stopped() {
    let manager = attached();
    let actor = RecordingActor::new("bridge").failing_start("port in use");
    manager.register(actor.clone()).unwrap();

    let err = manager.start("bridge").await.unwrap_err();

    assert_eq!(
        err,
        ActorError::Hook {
            id: "bridge".to_string(),
            hook: Hook::Start,
            message: "port in use".to_string(),
        }
    );
    assert_eq!(err.to_string(), "actor 'bridge' on_start failed: port in use");
    assert_eq!(manager.status("bridge"), Some(ActorStatus::Registered));
    manager.notify_state_change(&EngineState::new(0));
    assert_eq!(actor.state_changes(), 0);
}

#[tokio::test]
async fn failing_stop_still_stops() {
    let manager = attached();
    let actor = RecordingActor::new("bridge").failing_stop("flush failed");
    manager.register(actor.clone()).unwrap();
    manager.start("bridge").await.unwrap();

    let err = manager.stop("bridge").await.unwrap_err();

    assert!(matches!(err, ActorError::Hook { hook: Hook::Stop, .. }));
    assert!(!manager.is_active("bridge"));
    manager.notify_state_change(&EngineState::new(0));
    assert_eq!(actor.state_changes(), 0);
}

#[tokio::test]
async fn start_all_runs_in_order_and_stops_at_first_failure() {
    let manager = attached();
    manager.register(RecordingActor::new("a")).unwrap();
    manager
        .register(RecordingActor::new("b").failing_start("boom"))
        .unwrap();
    let c = RecordingActor::new("c");
    manager.register(c.clone()).unwrap();

    let err = manager.start_all().await.unwrap_err();

    assert!(matches!(err, ActorError::Hook { ref id, .. } if id == "b"));
    assert_eq!(manager.active_ids(), vec!["a"]);
    assert!(c.calls().is_empty());
}

#[tokio::test]
async fn start_all_skips_running_actors() {
    let manager = attached();
    let a = RecordingActor::new("a");
    manager.register(a.clone()).unwrap();
    manager.register(RecordingActor::new("b")).unwrap();
    manager.start("a").await.unwrap();

    manager.start_all().await.unwrap();

    assert_eq!(manager.active_ids(), vec!["a", "b"]);
    assert_eq!(a.calls(), vec![ActorCall::Start]);
}

#[tokio::test]
async fn stop_all_runs_in_reverse_and_attempts_every_actor() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let manager = attached();
    manager.register(OrderActor::new("first", &log)).unwrap();
    manager
        .register(OrderActor {
            fail_stop: true,
            ..OrderActor::new("second", &log)
        })
        .unwrap();
    manager.register(OrderActor::new("third", &log)).unwrap();
    manager.start_all().await.unwrap();

    let err = manager.stop_all().await.unwrap_err();

    assert_eq!(
        err,
        ActorError::Hook {
            id: "second".to_string(),
            hook: Hook::Stop,
            message: "second refused".to_string(),
        }
    );
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "start:first",
            "start:second",
            "start:third",
            "stop:third",
            "stop:second",
            "stop:first",
        ]
    );
    assert!(manager.active_ids().is_empty());
}

#[tokio::test]
async fn panicking_state_handler_does_not_block_others() {
    let manager = attached();
    let broken = RecordingActor::new("broken").panicking();
    let healthy = RecordingActor::new("healthy");
    manager.register(broken.clone()).unwrap();
    manager.register(healthy.clone()).unwrap();
    manager.start_all().await.unwrap();

    manager.notify_state_change(&EngineState::new(0));
    manager.notify_state_change(&EngineState::new(1));

    assert_eq!(broken.state_changes(), 2);
    assert_eq!(healthy.state_changes(), 2);
}

#[tokio::test]
async fn dispatch_steps_the_engine_and_notifies() {
    let manager = attached();
    let actor = RecordingActor::new("watcher");
    manager.register(actor.clone()).unwrap();
    manager.start("watcher").await.unwrap();

    let result = manager
        .dispatch(&[Event::tag_only("A"), Event::tag_only("B")])
        .unwrap();

    assert_eq!(result.state.context, 2);
    assert_eq!(actor.state_changes(), 1);
    assert_eq!(manager.engine().unwrap().get_context(), 2);

    let detached: ActorManager<Counter> = ActorManager::new();
    assert!(matches!(
        detached.dispatch(&[]),
        Err(ActorError::NotAttached)
    ));
}

#[tokio::test]
async fn starting_actor_gets_no_notifications() {
    let manager = attached();
    let (release, gate) = oneshot::channel();
    let changes = Arc::new(Mutex::new(0));
    manager
        .register(SlowActor {
            release: Mutex::new(Some(gate)),
            changes: Arc::clone(&changes),
        })
        .unwrap();

    let starter = manager.clone();
    let start = tokio::spawn(async move { starter.start("slow").await });
    while manager.status("slow") != Some(ActorStatus::Starting) {
        tokio::task::yield_now().await;
    }

    manager.notify_state_change(&EngineState::new(0));
    assert_eq!(*changes.lock().unwrap(), 0);
    assert_eq!(
        manager.start("slow").await,
        Err(ActorError::AlreadyStarted("slow".to_string()))
    );
    assert_eq!(
        manager.stop("slow").await,
        Err(ActorError::NotStarted("slow".to_string()))
    );

    release.send(()).unwrap();
    start.await.unwrap().unwrap();

    manager.notify_state_change(&EngineState::new(0));
    assert_eq!(*changes.lock().unwrap(), 1);
}

#[tokio::test(start_paused = true)]
async fn abandoned_start_resets_the_actor() {
    let manager = attached();
    let (_release, gate) = oneshot::channel::<()>();
    manager
        .register(SlowActor {
            release: Mutex::new(Some(gate)),
            changes: Arc::new(Mutex::new(0)),
        })
        .unwrap();

    let outcome = tokio::time::timeout(Duration::from_secs(1), manager.start("slow")).await;

    assert!(outcome.is_err());
    assert_eq!(manager.status("slow"), Some(ActorStatus::Registered));
}
