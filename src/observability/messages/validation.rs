// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for configuration validation errors.
//!
//! This module contains message types for logging events related to:
//! * Cyclic connection detection
//! * Connections pointing at undeclared nodes
//! * Duplicate node id detection

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Cycle detected in the connection graph.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use pipeflow::observability::messages::validation::CyclicGraphDetected;
///
/// let cycle = vec!["a", "b", "c", "a"];
/// let msg = CyclicGraphDetected {
///     cycle: &cycle,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct CyclicGraphDetected<'a> {
    pub cycle: &'a [&'a str],
}

impl Display for CyclicGraphDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Cyclic connection detected: {}", self.cycle.join(" -> "))
    }
}

impl StructuredLog for CyclicGraphDetected<'_> {
    fn log(&self) {
        tracing::error!(
            cycle = self.cycle.join(" -> "),
            cycle_length = self.cycle.len(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::ERROR,
            "span_name",
            name = name,
            cycle = self.cycle.join(" -> "),
            cycle_length = self.cycle.len(),
        )
    }
}

/// A connection names a node that is not declared.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use pipeflow::observability::messages::validation::UnresolvedTargetDetected;
///
/// let msg = UnresolvedTargetDetected {
///     node_id: "source",
///     port: "out1",
///     missing_node: "ghost",
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct UnresolvedTargetDetected<'a> {
    pub node_id: &'a str,
    pub port: &'a str,
    pub missing_node: &'a str,
}

impl Display for UnresolvedTargetDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' connects port '{}' to undeclared node '{}'",
            self.node_id, self.port, self.missing_node
        )
    }
}

impl StructuredLog for UnresolvedTargetDetected<'_> {
    fn log(&self) {
        tracing::error!(
            node_id = self.node_id,
            port = self.port,
            missing_node = self.missing_node,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::ERROR,
            "span_name",
            name = name,
            node_id = self.node_id,
            port = self.port,
            missing_node = self.missing_node,
        )
    }
}

/// The same node id is declared more than once.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct DuplicateNodeIdDetected<'a> {
    pub node_id: &'a str,
}

impl Display for DuplicateNodeIdDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Duplicate node id: '{}'", self.node_id)
    }
}

impl StructuredLog for DuplicateNodeIdDetected<'_> {
    fn log(&self) {
        tracing::error!(node_id = self.node_id, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::ERROR,
            "span_name",
            name = name,
            node_id = self.node_id,
        )
    }
}
