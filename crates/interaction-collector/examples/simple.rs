//! Simple example demonstrating basic usage of interaction-collector
//!
//! This example shows how to:
//! - Post a confirmation prompt and wait for its author to press a button
//! - Run a short poll that keeps one vote per user
//! - Turn an expired collector into a "ran out of time" reply
//!
//! A spawned task stands in for the gateway connection and pushes presses into the bus.

use interaction_collector::prelude::*;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), CollectorError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let bus = LocalBus::new();
    let author = Actor::new(42, "author");
    let prompt = MessageRef::new(1001, 2002);
    let poll = MessageRef::new(1002, 2002);

    // Simulated gateway: presses arrive a little after the prompts are posted
    let gateway = bus.clone();
    let voter = author.clone();
    let gateway_task = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        gateway.publish_interaction(
            ComponentInteraction::new(1, prompt, "confirm"),
            Some(voter.clone()),
        );

        tokio::time::sleep(Duration::from_millis(50)).await;
        for (id, user, choice) in [(2, 42, "pizza"), (3, 7, "tacos"), (4, 42, "tacos")] {
            gateway.publish_interaction(
                ComponentInteraction::new(id, poll, choice),
                Some(Actor::new(user, format!("user{}", user))),
            );
        }
    });

    println!("Waiting for confirmation...");
    let confirmation = await_one(
        &bus,
        prompt,
        CollectorFilter::from_actor(author.id),
        InteractionOptions::new().with_time(Duration::from_secs(5)),
    )
    .await?;
    println!("Author pressed: {}", confirmation.component_id);

    println!("Collecting votes...");
    let votes = AwaitInteractions::new(poll)
        .filter(CollectorFilter::all().one_per_actor())
        .options(
            InteractionOptions::new()
                .with_time(Duration::from_millis(500))
                .with_idle(Duration::from_millis(200)),
        )
        .success_reasons([CollectorEndReason::Time, CollectorEndReason::Idle])
        .wait(&bus)
        .await?;
    for vote in votes.values() {
        println!("  vote: {}", vote.component_id);
    }

    gateway_task.await.ok();

    println!("Waiting for a press that never comes...");
    let expired = MessageRef::new(1003, 2002);
    match await_one(
        &bus,
        expired,
        CollectorFilter::all(),
        InteractionOptions::new().with_time(Duration::from_millis(100)),
    )
    .await
    {
        Ok(interaction) => println!("Unexpected press: {}", interaction.component_id),
        Err(e) if e.end_reason().is_some_and(CollectorEndReason::is_timeout) => {
            println!("Ran out of time.");
        }
        Err(e) => return Err(e),
    }

    println!("\nFinalized messages:");
    for finalized in bus.finalized() {
        println!("  {} -> {:?}", finalized.message.id, finalized.selected);
    }

    Ok(())
}
