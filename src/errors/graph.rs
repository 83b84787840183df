// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for graph assembly and node initialization.

use crate::engine::NodeKind;
use crate::errors::{OperationError, ValidationError};

/// Errors that can occur while building or initializing a graph
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// The config describes an invalid graph
    #[error("invalid graph:\n{}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("\n"))]
    Invalid(Vec<ValidationError>),

    /// No operation set is registered for a node's kind
    #[error("node '{node_id}' has kind {kind} but no operation is registered for it")]
    UnboundOperation { node_id: String, kind: NodeKind },

    /// A node's one-time initializer failed
    #[error("initializing node '{node_id}' failed: {source}")]
    InitFailed {
        node_id: String,
        #[source]
        source: OperationError,
    },
}
