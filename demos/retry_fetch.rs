//! Retry With Composed Fragments
//!
//! This example demonstrates guarded sequences and configuration composition.
//!
//! Key concepts:
//! - Ordered edge sequences where the first passing guard wins
//! - Entry hooks counting attempts
//! - A second fragment prepending a guard to an existing transition
//! - Eager validation of the composed configuration
//!
//! Run with: cargo run --example retry_fetch

use serde_json::{json, Value};
use statewright::builder::{MachineBuilder, StateBuilder};
use statewright::compose::{compose_fsm_config, ComposeOptions, TransitionPolicy};
use statewright::core::{Payload, TransitionEdge};
use statewright::machine::Machine;
use statewright::validation::validate_config;
use stillwater::validation::Validation;

fn attempts(c: &Value) -> i64 {
    c["attempts"].as_i64().unwrap_or(0)
}

fn main() {
    println!("=== Retry With Composed Fragments ===\n");

    let fetch = MachineBuilder::new()
        .initial("IDLE")
        .context(json!({ "attempts": 0, "max": 2, "online": true }))
        .state("IDLE", StateBuilder::new().on("fetch", TransitionEdge::to("FETCHING")))
        .state(
            "FETCHING",
            StateBuilder::new()
                .on_enter(|c: &mut Value, _: &Payload| c["attempts"] = json!(attempts(c) + 1))
                .on("resolve", "IDLE")
                .on(
                    "reject",
                    vec![
                        TransitionEdge::to("RETRYING").guard(|c: &Value, _: &Payload| {
                            attempts(c) < c["max"].as_i64().unwrap_or(0)
                        }),
                        TransitionEdge::to("FAILED"),
                    ],
                ),
        )
        .state("RETRYING", StateBuilder::new().on("retry", "FETCHING"))
        .state("FAILED", StateBuilder::new().on("*", "IDLE"))
        .fragment();

    let connectivity = MachineBuilder::new()
        .state(
            "IDLE",
            StateBuilder::new().on(
                "fetch",
                TransitionEdge::to("OFFLINE")
                    .guard(|c: &Value, _: &Payload| c["online"] != json!(true)),
            ),
        )
        .state("OFFLINE", StateBuilder::new().on("reconnect", "IDLE"))
        .fragment();

    let options = ComposeOptions::new().transitions(TransitionPolicy::Prepend);
    let config = compose_fsm_config(vec![fetch, connectivity], options).unwrap();

    match validate_config(&config) {
        Validation::Success(_) => println!("Composed configuration is valid\n"),
        Validation::Failure(violations) => {
            for violation in violations.iter() {
                println!("violation: {violation}");
            }
            return;
        }
    }

    let mut machine = Machine::new(config);
    for event in ["fetch", "reject", "retry", "reject", "anything"] {
        let state = machine.transition(event, None).unwrap();
        println!(
            "{event:>9} -> {state:<9} attempts = {}",
            attempts(machine.context())
        );
    }

    println!("\nResetting restores a fresh context:");
    machine.reset();
    println!("  state = {}, context = {}", machine.state(), machine.context());

    println!("\n=== Example Complete ===");
}
