//! Actor manager specs: actors hear state changes only while active, and
//! lifecycle misuse is an explicit error.

use crate::prelude::*;
use crate::prelude::assert_eq;

type Counters = SharedEngine<Counter>;

async fn manager_with(actor: &RecordingActor) -> ActorManager<Counters> {
    let manager = ActorManager::new();
    manager.attach_engine(SharedEngine::new(counter_engine(0)));
    manager.register(actor.clone()).unwrap();
    manager
}

#[tokio::test]
async fn stopped_actors_do_not_hear_state_changes() {
    let actor = RecordingActor::new("recorder");
    let manager = manager_with(&actor).await;

    manager.start("recorder").await.unwrap();
    manager.dispatch(&[increment(1)]).unwrap();
    manager.stop("recorder").await.unwrap();
    manager.dispatch(&[increment(1)]).unwrap();
    manager.notify_state_change(&EngineState::new(Counter { count: 7 }));

    assert_eq!(
        actor.calls(),
        vec![ActorCall::Start, ActorCall::StateChange, ActorCall::Stop]
    );
}

#[tokio::test]
async fn starting_twice_is_an_error() {
    let actor = RecordingActor::new("recorder");
    let manager = manager_with(&actor).await;
    manager.start("recorder").await.unwrap();

    let err = manager.start("recorder").await.unwrap_err();

    assert_eq!(err, ActorError::AlreadyStarted("recorder".to_string()));
    assert_eq!(actor.calls(), vec![ActorCall::Start]);
}

#[tokio::test]
async fn actors_never_started_hear_nothing() {
    let actor = RecordingActor::new("idle");
    let manager = manager_with(&actor).await;

    manager.dispatch(&[increment(1)]).unwrap();

    assert!(actor.calls().is_empty());
    assert!(!manager.is_active("idle"));
}

#[tokio::test]
async fn a_panicking_actor_does_not_block_the_others() {
    let loud = RecordingActor::new("loud").panicking();
    let quiet = RecordingActor::new("quiet");
    let manager = manager_with(&loud).await;
    manager.register(quiet.clone()).unwrap();
    manager.start_all().await.unwrap();

    let result = manager.dispatch(&[increment(2)]).unwrap();

    assert_eq!(result.state.context.count, 2);
    assert_eq!(quiet.state_changes(), 1);
    assert!(manager.is_active("loud"));
}

#[tokio::test]
async fn mirror_keeps_a_reactive_store_in_step() {
    let store = ReactiveEngine::default();
    let manager: ActorManager<Counters> = ActorManager::new();
    manager.attach_engine(SharedEngine::new(counter_engine(99)));
    manager
        .register(ReactiveMirror::new("mirror", store.clone()))
        .unwrap();
    manager.start("mirror").await.unwrap();

    manager.dispatch(&[increment(2)]).unwrap();

    assert_eq!(store.context(), json!({ "count": 101 }));
    assert_eq!(store.state().facts.len(), 1);
}
