//! Diagram Codec and Code Generation
//!
//! This example demonstrates the Mermaid `stateDiagram-v2` codec.
//!
//! Key concepts:
//! - Decoding diagram text into a configuration with placeholder logic
//! - Re-encoding the configuration without losing markers
//! - Generating a Rust skeleton to fill in real guards and actions
//!
//! Run with: cargo run --example diagram_codegen

use statewright::core::MachineConfig;
use statewright::diagram::{decode, encode, generate_skeleton, parse, SkeletonOptions};
use statewright::machine::Machine;

const DIAGRAM: &str = "\
stateDiagram-v2
    %% Checkout flow
    [*] --> CART
    CART --> CHECKOUT: submit [guard cart not empty]
    CART --> CART: add_item / (action internal push item)
    CHECKOUT --> PAID: pay [guard 1] / (action charge card)
    CHECKOUT --> DECLINED: pay [guard 2]
    DECLINED --> CART: * (any)
    PAID --> [*]
";

fn main() {
    println!("=== Diagram Codec and Code Generation ===\n");

    let config: MachineConfig<()> = decode(DIAGRAM).unwrap();
    println!("Decoded states: {:?}\n", config.states.keys().collect::<Vec<_>>());

    println!("Re-encoded:\n{}", encode(&config));

    let mut machine = Machine::new(config);
    machine.transition("add_item", None).unwrap();
    machine.transition("submit", None).unwrap();
    println!(
        "Placeholder guards permit everything: pay -> {}\n",
        machine.transition("pay", None).unwrap()
    );

    let diagram = parse(DIAGRAM).unwrap();
    let options = SkeletonOptions::new().function_name("checkout_config");
    let skeleton = generate_skeleton(&diagram, &options);
    println!("Generated skeleton:\n\n{skeleton}");

    println!("=== Example Complete ===");
}
