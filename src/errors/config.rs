// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

/// Errors that can occur during pipeline graph validation
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A cycle was found among the node connections
    CyclicGraph {
        /// The cycle path, first node repeated at the end
        cycle: Vec<String>,
    },
    /// A connection points at a node that doesn't exist
    UnresolvedTarget {
        /// The node owning the connection
        node_id: String,
        /// The output port the connection leaves from
        port: String,
        /// The target node that couldn't be resolved
        missing_node: String,
    },
    /// A legacy "node-port" target string could not be split
    MalformedTarget {
        /// The node owning the connection
        node_id: String,
        /// The raw target text
        target: String,
    },
    /// Two nodes share an id
    DuplicateNodeId {
        /// The duplicate node ID
        node_id: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::CyclicGraph { cycle } => {
                write!(f, "Cyclic connection detected: {}", cycle.join(" -> "))
            }
            ValidationError::UnresolvedTarget {
                node_id,
                port,
                missing_node,
            } => {
                write!(
                    f,
                    "Node '{}' connects port '{}' to '{}' which does not exist",
                    node_id, port, missing_node
                )
            }
            ValidationError::MalformedTarget { node_id, target } => {
                write!(
                    f,
                    "Node '{}' has malformed connection target '{}', expected '<node>-<port>'",
                    node_id, target
                )
            }
            ValidationError::DuplicateNodeId { node_id } => {
                write!(f, "Duplicate node ID: '{}'", node_id)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors raised while loading a pipeline configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("configuration validation failed:\n{}", join_errors(.0))]
    Invalid(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
