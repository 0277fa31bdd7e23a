//! Configuration violations reported by eager validation.

use thiserror::Error;

/// Problems found in a machine configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigViolation {
    #[error("Initial state `{initial}` is not defined")]
    UnknownInitialState { initial: String },

    #[error("State `{state}` has no `on` mapping")]
    MissingTransitions { state: String },

    #[error("State `{state}` handles `{event}` with undefined target `{target}`")]
    UnknownTarget {
        state: String,
        event: String,
        target: String,
    },

    #[error("`*` is reserved for wildcard events and cannot name a state")]
    ReservedStateName,

    #[error("State `{state}` has an empty event name")]
    EmptyEventName { state: String },

    #[error("State `{state}` handles `{event}` with an empty edge sequence")]
    EmptySequence { state: String, event: String },
}
