//! Traffic Light State Machine
//!
//! This example demonstrates a simple cyclic state machine.
//!
//! Key concepts:
//! - Cyclic state transitions driven by one event
//! - Internal transitions that update context without leaving the state
//! - Subscribers observing every change
//! - Debug logging through the tracing sink
//!
//! Run with: cargo run --example traffic_light

use statewright::builder::{MachineBuilder, StateBuilder};
use statewright::core::{Payload, StateTransition, TransitionEdge};
use statewright::logging::TracingLogger;
use statewright::machine::Machine;
use std::sync::Arc;

#[derive(Clone, Default, Debug)]
struct Intersection {
    cycles: u32,
    pedestrians_waiting: u32,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("statewright=debug")
        .init();

    println!("=== Traffic Light State Machine ===\n");

    let config = MachineBuilder::new()
        .initial("RED")
        .debug(true)
        .logger(Arc::new(TracingLogger))
        .state(
            "RED",
            StateBuilder::new()
                .on_enter(|c: &mut Intersection, _: &Payload| c.cycles += 1)
                .on("timer", "GREEN")
                .on(
                    "button",
                    TransitionEdge::internal()
                        .action(|c: &mut Intersection, _: &Payload| c.pedestrians_waiting += 1),
                ),
        )
        .state("GREEN", StateBuilder::new().on("timer", "YELLOW"))
        .state(
            "YELLOW",
            StateBuilder::new()
                .on("timer", "RED")
                .on_exit(|c: &mut Intersection, _: &Payload| c.pedestrians_waiting = 0),
        )
        .build()
        .unwrap();

    let mut machine = Machine::new(config);
    machine.subscribe(|machine: &mut Machine<Intersection>, record: &StateTransition| {
        println!(
            "  {:?}: {} -> {}  ({:?})",
            record.kind,
            record.from,
            record.to,
            machine.context()
        );
    });

    println!("Initial state: {}\n", machine.state());

    println!("Pedestrian presses the button twice:");
    machine.transition("button", None).unwrap();
    machine.transition("button", None).unwrap();

    println!("\nTwo full cycles:");
    for _ in 0..6 {
        machine.transition("timer", None).unwrap();
    }

    machine.transition("timer", None).unwrap();
    println!(
        "\nButton accepted in {}: {}",
        machine.state(),
        machine.can_transition("button", None)
    );
    println!("Path: {}", machine.history().path().join(" -> "));

    println!("\n=== Example Complete ===");
}
