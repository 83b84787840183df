// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while a wave is running.

/// Failure returned by a bound node operation.
///
/// The trigger engine turns any of these into an `Error` status plus an
/// error notification for the failing node; it never propagates them to the
/// caller or to other activations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OperationError {
    /// The node's inputs could not be interpreted
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A required config key is missing or has the wrong shape
    #[error("invalid config key '{key}': {reason}")]
    InvalidConfig { key: String, reason: String },

    /// The external system behind the operation reported a failure
    #[error("{0}")]
    External(String),

    /// The operation task panicked or was aborted
    #[error("operation crashed: {0}")]
    Crashed(String),
}

impl OperationError {
    pub fn external(message: impl Into<String>) -> Self {
        OperationError::External(message.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        OperationError::InvalidInput(message.into())
    }
}

/// Errors surfaced to whoever drives a wave.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("node '{0}' is not part of the graph")]
    UnknownNode(String),
}
