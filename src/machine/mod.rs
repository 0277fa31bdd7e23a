//! The transition engine.
//!
//! A [`Machine`] owns a configuration, its current and previous state and
//! its context. All operations are synchronous and run to completion before
//! returning.

mod engine;
mod error;

pub use error::MachineError;
pub use engine::{Machine, Subscriber, SubscriptionId};
