//! Errors returned by the transition engine.

use thiserror::Error;

/// Errors that can occur when executing transitions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MachineError {
    /// The current state is undefined or has no `on` mapping. Returned
    /// regardless of assert mode.
    #[error("Configuration error in state `{state}`: {reason}")]
    Configuration { state: String, reason: String },

    /// No entry for the event or the wildcard, or every guard rejected.
    /// Only returned in assert mode.
    #[error("Invalid transition: event `{event}` is not accepted in state `{state}`")]
    InvalidTransition { state: String, event: String },
}

impl MachineError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, MachineError::Configuration { .. })
    }

    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, MachineError::InvalidTransition { .. })
    }
}
