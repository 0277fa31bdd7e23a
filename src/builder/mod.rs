//! Builder API for ergonomic configuration construction.
//!
//! Configurations can always be written as plain struct literals; the
//! builders remove the `IndexMap` and `Option` boilerplate.

pub mod error;
pub mod machine;
pub mod state;

pub use error::BuildError;
pub use machine::MachineBuilder;
pub use state::StateBuilder;
