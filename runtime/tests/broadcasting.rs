//! Integration tests for Store action broadcasting
//!
//! Callers such as a screen driver wait for the action that concludes a
//! request chain (load → backfill → loaded) without polling state.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect

use freizeit_core::{SmallVec, async_effect, effect::Effect, reducer::Reducer, smallvec};
use freizeit_runtime::{Store, StoreError};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum TestAction {
    /// Start loading screen `id`
    Load { id: u64 },
    /// One loading step finished
    StepDone { id: u64, step: u32 },
    /// Loading finished (terminal action)
    Loaded { id: u64 },
    /// Loading failed (never produced)
    Failed { id: u64 },
    /// Bump the counter
    Tap,
    /// Counter changed
    Tapped { value: u32 },
}

#[derive(Debug, Clone, Default)]
struct TestState {
    taps: u32,
    steps: Vec<u32>,
}

#[derive(Clone)]
struct TestEnvironment;

#[derive(Clone)]
struct TestReducer;

impl Reducer for TestReducer {
    type State = TestState;
    type Action = TestAction;
    type Environment = TestEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TestAction::Load { id } => {
                state.steps.clear();
                smallvec![async_effect! {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    Some(TestAction::StepDone { id, step: 1 })
                }]
            },
            TestAction::StepDone { id, step } => {
                state.steps.push(step);
                if step < 3 {
                    smallvec![async_effect! {
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        Some(TestAction::StepDone { id, step: step + 1 })
                    }]
                } else {
                    smallvec![async_effect! { Some(TestAction::Loaded { id }) }]
                }
            },
            TestAction::Tap => {
                state.taps += 1;
                let value = state.taps;
                smallvec![async_effect! { Some(TestAction::Tapped { value }) }]
            },
            TestAction::Loaded { .. } | TestAction::Failed { .. } | TestAction::Tapped { .. } => {
                SmallVec::new()
            },
        }
    }
}

fn store() -> Store<TestState, TestAction, TestEnvironment, TestReducer> {
    Store::new(TestState::default(), TestReducer, TestEnvironment)
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_wait_for_immediate_feedback() {
    let store = store();

    let result = store
        .send_and_wait_for(
            TestAction::Tap,
            |action| matches!(action, TestAction::Tapped { .. }),
            Duration::from_secs(1),
        )
        .await;

    assert_eq!(result.unwrap(), TestAction::Tapped { value: 1 });
}

#[tokio::test(start_paused = true)]
async fn test_wait_for_end_of_chain() {
    let store = store();

    let result = store
        .send_and_wait_for(
            TestAction::Load { id: 42 },
            |action| matches!(action, TestAction::Loaded { id: 42 }),
            Duration::from_secs(1),
        )
        .await;

    assert_eq!(result.unwrap(), TestAction::Loaded { id: 42 });
    assert_eq!(store.state(|s| s.steps.clone()).await, vec![1, 2, 3]);
}

#[tokio::test(start_paused = true)]
async fn test_wait_times_out() {
    let store = store();

    let result = store
        .send_and_wait_for(
            TestAction::Load { id: 7 },
            |action| matches!(action, TestAction::Failed { id: 7 }),
            Duration::from_millis(50),
        )
        .await;

    assert!(matches!(result, Err(StoreError::Timeout)));
}

#[tokio::test]
async fn test_waiters_filter_by_id() {
    let store = Arc::new(store());

    let mut handles = Vec::new();
    for id in 1..=3 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .send_and_wait_for(
                    TestAction::Load { id },
                    move |action| matches!(action, TestAction::Loaded { id: done } if *done == id),
                    Duration::from_secs(2),
                )
                .await
        }));
    }

    for (index, handle) in handles.into_iter().enumerate() {
        let id = u64::try_from(index).unwrap() + 1;
        let result = handle.await.expect("task panicked");
        assert_eq!(result.unwrap(), TestAction::Loaded { id });
    }
}

#[tokio::test(start_paused = true)]
async fn test_subscriber_sees_feedback_in_order() {
    let store = store();
    let mut rx = store.subscribe_actions();

    store.send(TestAction::Load { id: 100 }).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let mut received = Vec::new();
    while let Ok(action) = rx.try_recv() {
        received.push(action);
    }
    assert_eq!(
        received,
        vec![
            TestAction::StepDone { id: 100, step: 1 },
            TestAction::StepDone { id: 100, step: 2 },
            TestAction::StepDone { id: 100, step: 3 },
            TestAction::Loaded { id: 100 },
        ]
    );
}

#[tokio::test]
async fn test_sent_actions_are_not_broadcast() {
    let store = store();
    let mut rx = store.subscribe_actions();

    store.send(TestAction::Loaded { id: 1 }).await.unwrap();

    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_lagging_subscriber_keeps_store_running() {
    let store = Store::with_broadcast_capacity(TestState::default(), TestReducer, TestEnvironment, 4);
    let mut rx = store.subscribe_actions();

    for _ in 0..20 {
        store.send(TestAction::Tap).await.unwrap();
    }
    tokio::time::sleep(Duration::from_millis(100)).await;

    let mut lagged = false;
    let mut received = 0;
    loop {
        match rx.try_recv() {
            Ok(_) => received += 1,
            Err(tokio::sync::broadcast::error::TryRecvError::Lagged(_)) => lagged = true,
            Err(_) => break,
        }
    }

    assert!(lagged);
    assert!(received > 0 && received < 20);
    assert_eq!(store.state(|s| s.taps).await, 20);
}
