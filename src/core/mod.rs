//! Core configuration model.
//!
//! This module contains the data definitions shared by the engine, the
//! diagram codec and the composer:
//! - State/event labels and the `Context` capability
//! - Guards, actions and lifecycle hooks
//! - Transition edges, definitions and pure edge resolution
//! - State and machine configuration
//! - Transition records and history
//!
//! Nothing in this module executes a transition; resolution is pure.

mod config;
mod guard;
mod history;
mod state;
mod transition;

pub use config::{ContextSource, MachineConfig, StateConfig, DEFAULT_HISTORY_LIMIT};
pub use guard::{Action, Guard, Hook};
pub use history::{StateHistory, StateTransition, TransitionKind};
pub use state::{is_wildcard, Context, Payload, WILDCARD};
pub use transition::{ResolvedEdge, TransitionDefinition, TransitionEdge};

pub(crate) use config::payload_or_null;
