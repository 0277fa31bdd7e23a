//! Composition errors.

use thiserror::Error;

/// Errors that can occur when composing configuration fragments.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ComposeError {
    #[error("No configuration fragments to compose")]
    NoFragments,

    #[error("No fragment defines an initial state")]
    MissingInitialState,

    #[error("Conflicting initial states: `{first}` and `{second}`")]
    ConflictingInitial { first: String, second: String },
}
