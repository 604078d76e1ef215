//! Integration tests for interaction-collector

use async_trait::async_trait;
use interaction_collector::prelude::*;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const MESSAGE: MessageRef = MessageRef {
    id: 1001,
    channel_id: 2002,
};

/// Helper to build a button press on the test message
fn press(id: Snowflake, component: &str) -> ComponentInteraction {
    ComponentInteraction::new(id, MESSAGE, component)
}

fn author() -> Actor {
    Actor::new(42, "author")
}

fn stranger() -> Actor {
    Actor::new(7, "stranger")
}

/// Helper to let spawned collectors subscribe before events are published
async fn settle() {
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_await_one_resolves_with_first_matching_press() {
    let bus = LocalBus::new();

    let task_bus = bus.clone();
    let waiter = tokio::spawn(async move {
        await_one(
            &task_bus,
            MESSAGE,
            CollectorFilter::from_actor(42),
            InteractionOptions::new(),
        )
        .await
    });
    settle().await;

    bus.publish_interaction(press(1, "cancel"), Some(stranger()));
    bus.publish_interaction(press(2, "confirm"), Some(author()));
    bus.publish_interaction(press(3, "cancel"), Some(author()));

    let interaction = waiter.await.unwrap().unwrap();
    assert_eq!(interaction.id, 2);
    assert_eq!(interaction.component_id, "confirm");

    assert_eq!(
        bus.finalized(),
        vec![FinalizedControls {
            message: MESSAGE,
            selected: vec!["confirm".to_string()],
        }]
    );
    assert_eq!(bus.subscriber_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_await_one_times_out() {
    let bus = LocalBus::new();

    let result = await_one(
        &bus,
        MESSAGE,
        CollectorFilter::all(),
        InteractionOptions::new().with_time(Duration::from_millis(100)),
    )
    .await;

    let error = result.unwrap_err();
    assert_eq!(error.end_reason(), Some(CollectorEndReason::Time));
    match error {
        CollectorError::Ended(ended) => assert!(ended.collected.is_empty()),
        other => panic!("unexpected error: {other}"),
    }
    // Controls are finalized on failure too.
    assert_eq!(bus.finalized().len(), 1);
    assert!(bus.finalized()[0].selected.is_empty());
}

#[tokio::test]
async fn test_await_one_fails_when_message_deleted() {
    let bus = LocalBus::new();

    let task_bus = bus.clone();
    let waiter = tokio::spawn(async move {
        await_one(
            &task_bus,
            MESSAGE,
            CollectorFilter::all(),
            InteractionOptions::new(),
        )
        .await
    });
    settle().await;

    bus.delete_message(MESSAGE);

    let error = waiter.await.unwrap().unwrap_err();
    assert_eq!(error.end_reason(), Some(CollectorEndReason::MessageDelete));
}

#[tokio::test]
async fn test_await_many_resolves_on_success_reason() {
    let bus = LocalBus::new();

    let task_bus = bus.clone();
    let waiter = tokio::spawn(async move {
        await_many(
            &task_bus,
            MESSAGE,
            CollectorFilter::all().one_per_actor(),
            InteractionOptions::new().with_max_users(2),
            &[CollectorEndReason::UserLimit],
        )
        .await
    });
    settle().await;

    bus.publish_interaction(press(1, "yes"), Some(author()));
    bus.publish_interaction(press(2, "no"), Some(author()));
    bus.publish_interaction(press(3, "yes"), Some(stranger()));

    let votes = waiter.await.unwrap().unwrap();
    let choices: Vec<&str> = votes.values().map(|i| i.component_id.as_str()).collect();
    assert_eq!(choices, vec!["no", "yes"]);
}

#[tokio::test(start_paused = true)]
async fn test_await_many_failure_carries_partial_snapshot() {
    let bus = LocalBus::new();

    let task_bus = bus.clone();
    let waiter = tokio::spawn(async move {
        await_many(
            &task_bus,
            MESSAGE,
            CollectorFilter::all(),
            InteractionOptions::new()
                .with_time(Duration::from_millis(500))
                .with_max(3),
            &[CollectorEndReason::Limit],
        )
        .await
    });
    settle().await;

    bus.publish_interaction(press(1, "a"), Some(author()));
    bus.publish_interaction(press(2, "b"), Some(stranger()));

    match waiter.await.unwrap() {
        Err(CollectorError::Ended(ended)) => {
            assert_eq!(ended.reason, CollectorEndReason::Time);
            assert_eq!(ended.collected.len(), 2);
        }
        other => panic!("unexpected outcome: {:?}", other.map(|c| c.len())),
    }
    assert_eq!(bus.finalized()[0].selected, vec!["a".to_string(), "b".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_idle_budget_reset_by_press() {
    let bus = LocalBus::new();
    let collector = InteractionCollector::for_message(
        &bus,
        MESSAGE,
        CollectorFilter::all(),
        InteractionOptions::new()
            .with_time(Duration::from_millis(1000))
            .with_idle(Duration::from_millis(50)),
    )
    .unwrap();

    tokio::time::sleep(Duration::from_millis(40)).await;
    bus.publish_interaction(press(1, "a"), Some(author()));

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!collector.is_ended(), "idle timer should have been reset");

    tokio::time::sleep(Duration::from_millis(45)).await;
    assert_eq!(collector.end_reason(), Some(CollectorEndReason::Idle));
    assert_eq!(bus.subscriber_count(), 0);
}

#[tokio::test]
async fn test_stop_resolves_awaiters_once() {
    let bus = LocalBus::new();
    let collector = InteractionCollector::for_message(
        &bus,
        MESSAGE,
        CollectorFilter::all(),
        InteractionOptions::new(),
    )
    .unwrap();

    let first = collector.clone();
    let second = collector.clone();
    let waiters = futures::future::join(first.ended(), second.ended());

    bus.publish_interaction(press(1, "a"), Some(author()));
    assert!(collector.stop(CollectorEndReason::User));
    assert!(!collector.stop(CollectorEndReason::User));

    let (a, b) = waiters.await;
    assert_eq!(a.reason, CollectorEndReason::User);
    assert_eq!(b.reason, CollectorEndReason::User);
    assert_eq!(a.collected.len(), 1);
}

/// Records hook calls and fails the terminal hook on demand
#[derive(Default)]
struct Journal {
    calls: Mutex<Vec<String>>,
    fail_on_end: bool,
}

impl CollectorListener<ComponentInteraction> for Journal {
    fn on_collect(&self, item: &ComponentInteraction, _actor: Option<&Actor>) -> HookResult {
        self.calls
            .lock()
            .unwrap()
            .push(format!("collect:{}", item.component_id));
        Ok(())
    }

    fn on_end(
        &self,
        collected: &Collected<ComponentInteraction>,
        reason: CollectorEndReason,
    ) -> HookResult {
        self.calls
            .lock()
            .unwrap()
            .push(format!("end:{}:{}", reason, collected.len()));
        if self.fail_on_end {
            return Err(HookError::new("could not render summary"));
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_listener_hooks_fire_in_order() {
    let bus = LocalBus::new();
    let journal = Arc::new(Journal::default());

    let task_bus = bus.clone();
    let listener = journal.clone();
    let waiter = tokio::spawn(async move {
        AwaitInteractions::new(MESSAGE)
            .options(InteractionOptions::new().with_max(2))
            .listener(listener)
            .wait(&task_bus)
            .await
    });
    settle().await;

    bus.publish_interaction(press(1, "a"), Some(author()));
    bus.publish_interaction(press(2, "b"), Some(author()));

    let collected = waiter.await.unwrap().unwrap();
    assert_eq!(collected.len(), 2);
    assert_eq!(
        *journal.calls.lock().unwrap(),
        vec!["collect:a", "collect:b", "end:LIMIT:2"]
    );
}

#[tokio::test]
async fn test_terminal_hook_error_reaches_awaiter() {
    let bus = LocalBus::new();
    let journal = Arc::new(Journal {
        fail_on_end: true,
        ..Journal::default()
    });

    let task_bus = bus.clone();
    let listener = journal.clone();
    let waiter = tokio::spawn(async move {
        AwaitInteractions::new(MESSAGE)
            .options(InteractionOptions::new().with_max(1))
            .listener(listener)
            .wait(&task_bus)
            .await
    });
    settle().await;

    bus.publish_interaction(press(1, "a"), Some(author()));

    match waiter.await.unwrap() {
        Err(CollectorError::HookError(e)) => assert_eq!(e.message(), "could not render summary"),
        other => panic!("unexpected outcome: {:?}", other.map(|c| c.len())),
    }
    // Cleanup still ran.
    assert_eq!(bus.finalized().len(), 1);
}

#[tokio::test]
async fn test_abandoned_wait_ends_collector_without_finalizing() {
    let bus = LocalBus::new();
    let journal = Arc::new(Journal::default());

    let task_bus = bus.clone();
    let listener = journal.clone();
    let waiter = tokio::spawn(async move {
        AwaitInteractions::new(MESSAGE)
            .listener(listener)
            .wait(&task_bus)
            .await
    });
    settle().await;

    bus.publish_interaction(press(1, "a"), Some(author()));
    waiter.abort();
    assert!(waiter.await.unwrap_err().is_cancelled());

    assert_eq!(
        *journal.calls.lock().unwrap(),
        vec!["collect:a", "end:USER_CANCEL:1"]
    );
    assert!(bus.finalized().is_empty());
    assert_eq!(bus.subscriber_count(), 0);
}

/// Finalizer recording what it was asked to disable
#[derive(Default)]
struct RecordingFinalizer {
    seen: Mutex<Vec<Vec<String>>>,
}

#[async_trait]
impl ControlFinalizer for RecordingFinalizer {
    async fn disable_controls(
        &self,
        _message: &MessageRef,
        selected: &[String],
    ) -> Result<(), CollectorError> {
        self.seen.lock().unwrap().push(selected.to_vec());
        Err(CollectorError::FinalizeError("message is gone".to_string()))
    }
}

#[tokio::test]
async fn test_custom_finalizer_runs_once_and_errors_are_not_surfaced() {
    let bus = LocalBus::new();
    let finalizer = Arc::new(RecordingFinalizer::default());

    let task_bus = bus.clone();
    let custom = finalizer.clone();
    let waiter = tokio::spawn(async move {
        AwaitInteractions::new(MESSAGE)
            .finalizer(custom)
            .wait_one(&task_bus)
            .await
    });
    settle().await;

    bus.publish_interaction(press(1, "ok"), Some(author()));

    let interaction = waiter.await.unwrap().unwrap();
    assert_eq!(interaction.component_id, "ok");
    assert_eq!(*finalizer.seen.lock().unwrap(), vec![vec!["ok".to_string()]]);
    assert!(bus.finalized().is_empty());
}

#[tokio::test]
async fn test_many_collectors_share_one_bus() {
    let bus = LocalBus::new();
    let other = MessageRef::new(3003, 2002);

    let a = InteractionCollector::for_message(
        &bus,
        MESSAGE,
        CollectorFilter::all(),
        InteractionOptions::new().with_max(1),
    )
    .unwrap();
    let b = InteractionCollector::for_message(
        &bus,
        other,
        CollectorFilter::all(),
        InteractionOptions::new(),
    )
    .unwrap();

    bus.publish_interaction(press(1, "a"), Some(author()));
    bus.publish_interaction(ComponentInteraction::new(2, other, "b"), Some(author()));
    assert_eq!(a.end_reason(), Some(CollectorEndReason::Limit));
    assert_eq!(b.len(), 1);

    bus.delete_channel(2002);
    assert_eq!(a.end_reason(), Some(CollectorEndReason::Limit));
    assert_eq!(b.end_reason(), Some(CollectorEndReason::ChannelDelete));
    assert_eq!(bus.subscriber_count(), 0);
}

#[tokio::test]
async fn test_gateway_events_route_through_publish() {
    let bus = LocalBus::new();
    let collector = InteractionCollector::for_channel(
        &bus,
        2002,
        CollectorFilter::all(),
        InteractionOptions::new(),
    )
    .unwrap();

    let interaction: ComponentInteraction = serde_json::from_value(serde_json::json!({
        "id": 9,
        "message_id": 1001,
        "channel_id": 2002,
        "component_id": "menu",
        "values": ["first", "second"]
    }))
    .unwrap();
    bus.publish(GatewayEvent::Interaction(
        interaction_collector::entities::InteractionCreate {
            interaction,
            actor: Some(author()),
        },
    ));

    let collected = collector.collected();
    assert_eq!(collected.first().unwrap().values, vec!["first", "second"]);
}
