//! Diagram decoding errors.

use thiserror::Error;

/// Errors that can occur when decoding a state diagram.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Missing `stateDiagram` header")]
    MissingHeader,

    #[error("Missing initial state declaration (`[*] --> State`)")]
    MissingInitialState,
}
