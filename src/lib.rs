//! Statewright: a small synchronous finite-state-machine library
//!
//! A machine is driven by plain data: a [`MachineConfig`] maps each state to
//! the events it accepts. The engine resolves each event to at most one edge
//! using pure guards evaluated on a snapshot of the context, then applies the
//! edge's action and the states' lifecycle hooks. Everything else in the
//! crate works on the same configuration model.
//!
//! # Core Concepts
//!
//! - **Machine**: Runtime state, context, history and subscribers
//! - **Definitions**: Bare targets, single edges, or ordered edge sequences
//! - **Diagram codec**: Mermaid `stateDiagram-v2` encoding and decoding
//! - **Composition**: Merging partial configurations under explicit policies
//!
//! # Example
//!
//! ```rust
//! use statewright::builder::{MachineBuilder, StateBuilder};
//! use statewright::core::{Payload, TransitionEdge};
//! use statewright::machine::Machine;
//!
//! #[derive(Clone, Default)]
//! struct Retry {
//!     attempts: u32,
//! }
//!
//! let config = MachineBuilder::new()
//!     .initial("IDLE")
//!     .state("IDLE", StateBuilder::new().on("fetch", "FETCHING"))
//!     .state(
//!         "FETCHING",
//!         StateBuilder::new()
//!             .on("resolve", "IDLE")
//!             .on(
//!                 "reject",
//!                 vec![
//!                     TransitionEdge::to("FETCHING")
//!                         .guard(|c: &Retry, _: &Payload| c.attempts < 2)
//!                         .action(|c: &mut Retry, _: &Payload| c.attempts += 1),
//!                     TransitionEdge::to("FAILED"),
//!                 ],
//!             ),
//!     )
//!     .state("FAILED", StateBuilder::new())
//!     .build()
//!     .unwrap();
//!
//! let mut machine = Machine::new(config);
//! machine.transition("fetch", None).unwrap();
//! machine.transition("reject", None).unwrap();
//! machine.transition("reject", None).unwrap();
//!
//! assert!(machine.can_transition("reject", None));
//! assert_eq!(machine.transition("reject", None).unwrap(), "FAILED");
//! assert_eq!(machine.context().attempts, 2);
//! ```

pub mod builder;
pub mod compose;
pub mod core;
pub mod diagram;
pub mod logging;
pub mod machine;
pub mod validation;

// Re-export commonly used types
pub use crate::builder::{MachineBuilder, StateBuilder};
pub use crate::compose::{compose_fsm_config, ComposeOptions, ConfigFragment};
pub use crate::core::{
    Action, Guard, MachineConfig, Payload, StateConfig, TransitionDefinition, TransitionEdge,
};
pub use crate::diagram::{decode, encode, ParseError};
pub use crate::machine::{Machine, MachineError};
