// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for graph assembly and wave execution events.
//!
//! This module contains message types for logging events related to:
//! * Graph assembly and one-time node initialization
//! * Node activation lifecycle (start, skip, failure, completion)
//! * Fan-out to downstream nodes
//! * Input-only updates
//! * Wave cancellation and completion

use crate::errors::OperationError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Graph assembled from configuration.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use pipeflow::observability::messages::engine::GraphBuilt;
///
/// let msg = GraphBuilt {
///     node_count: 3,
///     edge_count: 2,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct GraphBuilt {
    pub node_count: usize,
    pub edge_count: usize,
}

impl Display for GraphBuilt {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Graph built: {} nodes, {} edges",
            self.node_count, self.edge_count
        )
    }
}

impl StructuredLog for GraphBuilt {
    fn log(&self) {
        tracing::info!(
            node_count = self.node_count,
            edge_count = self.edge_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "graph",
            span_name = name,
            node_count = self.node_count,
            edge_count = self.edge_count,
        )
    }
}

/// Node initializer completed.
///
/// # Log Level
/// `debug!` - Per-node detail
pub struct NodeInitialized<'a> {
    pub node_id: &'a str,
    pub kind: &'a str,
}

impl Display for NodeInitialized<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Initialized node '{}' ({})", self.node_id, self.kind)
    }
}

impl StructuredLog for NodeInitialized<'_> {
    fn log(&self) {
        tracing::debug!(node_id = self.node_id, kind = self.kind, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("init", span_name = name, node_id = self.node_id, kind = self.kind)
    }
}

/// Node initializer failed; graph initialization stops here.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct NodeInitFailed<'a> {
    pub node_id: &'a str,
    pub kind: &'a str,
    pub error: &'a OperationError,
}

impl Display for NodeInitFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Initializing node '{}' ({}) failed: {}",
            self.node_id, self.kind, self.error
        )
    }
}

impl StructuredLog for NodeInitFailed<'_> {
    fn log(&self) {
        tracing::error!(
            node_id = self.node_id,
            kind = self.kind,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "init",
            span_name = name,
            node_id = self.node_id,
            kind = self.kind,
            error = %self.error,
        )
    }
}

/// Node activation started after passing its readiness check.
///
/// # Log Level
/// `debug!` - Per-activation detail
///
/// # Example
/// ```
/// use pipeflow::observability::messages::engine::ActivationStarted;
///
/// let ports = vec!["in1".to_string()];
/// let msg = ActivationStarted {
///     node_id: "extract",
///     kind: "JsonExtractor",
///     run_id: "run-1",
///     triggered_ports: &ports,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct ActivationStarted<'a> {
    pub node_id: &'a str,
    pub kind: &'a str,
    pub run_id: &'a str,
    pub triggered_ports: &'a [String],
}

impl Display for ActivationStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Activating node '{}' ({}) triggered by [{}]",
            self.node_id,
            self.kind,
            self.triggered_ports.join(", ")
        )
    }
}

impl StructuredLog for ActivationStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            node_id = self.node_id,
            kind = self.kind,
            run_id = self.run_id,
            triggered_ports = ?self.triggered_ports,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "activation",
            span_name = name,
            node_id = self.node_id,
            kind = self.kind,
            run_id = self.run_id,
        )
    }
}

/// Activation skipped because the wave was cancelled.
///
/// # Log Level
/// `debug!` - Expected during shutdown
pub struct ActivationCancelled<'a> {
    pub node_id: &'a str,
    pub run_id: &'a str,
}

impl Display for ActivationCancelled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Wave cancelled, skipping node '{}'", self.node_id)
    }
}

impl StructuredLog for ActivationCancelled<'_> {
    fn log(&self) {
        tracing::debug!(node_id = self.node_id, run_id = self.run_id, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "activation",
            span_name = name,
            node_id = self.node_id,
            run_id = self.run_id,
        )
    }
}

/// Activation skipped because the node's inputs don't satisfy its readiness policy.
///
/// # Log Level
/// `trace!` - Routine in fan-in graphs
pub struct NodeNotReady<'a> {
    pub node_id: &'a str,
    pub run_id: &'a str,
    pub readiness: &'a str,
}

impl Display for NodeNotReady<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' not ready under '{}' readiness",
            self.node_id, self.readiness
        )
    }
}

impl StructuredLog for NodeNotReady<'_> {
    fn log(&self) {
        tracing::trace!(
            node_id = self.node_id,
            run_id = self.run_id,
            readiness = self.readiness,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!(
            "activation",
            span_name = name,
            node_id = self.node_id,
            run_id = self.run_id,
        )
    }
}

/// Node operation returned an error.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ActivationFailed<'a> {
    pub node_id: &'a str,
    pub run_id: &'a str,
    pub error: &'a OperationError,
}

impl Display for ActivationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Node '{}' failed: {}", self.node_id, self.error)
    }
}

impl StructuredLog for ActivationFailed<'_> {
    fn log(&self) {
        tracing::error!(
            node_id = self.node_id,
            run_id = self.run_id,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "activation",
            span_name = name,
            node_id = self.node_id,
            run_id = self.run_id,
            error = %self.error,
        )
    }
}

/// Node operation panicked; the panic was contained to its task.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct OperationCrashed<'a> {
    pub node_id: &'a str,
    pub operation: &'a str,
    pub reason: &'a str,
}

impl Display for OperationCrashed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Operation '{}' crashed on node '{}': {}",
            self.operation, self.node_id, self.reason
        )
    }
}

impl StructuredLog for OperationCrashed<'_> {
    fn log(&self) {
        tracing::error!(
            node_id = self.node_id,
            operation = self.operation,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "activation",
            span_name = name,
            node_id = self.node_id,
            operation = self.operation,
        )
    }
}

/// Downstream node scheduled after a parent wrote into it.
///
/// # Log Level
/// `debug!` - Per-edge detail
pub struct FanOutScheduled<'a> {
    pub source: &'a str,
    pub target: &'a str,
    pub ports: &'a [String],
}

impl Display for FanOutScheduled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' triggers '{}' on [{}]",
            self.source,
            self.target,
            self.ports.join(", ")
        )
    }
}

impl StructuredLog for FanOutScheduled<'_> {
    fn log(&self) {
        tracing::debug!(
            source = self.source,
            target = self.target,
            ports = ?self.ports,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "fan_out",
            span_name = name,
            source = self.source,
            target = self.target,
        )
    }
}

/// Node activation completed successfully.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use pipeflow::observability::messages::engine::ActivationCompleted;
///
/// let msg = ActivationCompleted {
///     node_id: "source",
///     run_id: "run-1",
///     output_ports: 1,
///     scheduled: 2,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ActivationCompleted<'a> {
    pub node_id: &'a str,
    pub run_id: &'a str,
    pub output_ports: usize,
    pub scheduled: usize,
}

impl Display for ActivationCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' completed: {} output ports, {} downstream activations",
            self.node_id, self.output_ports, self.scheduled
        )
    }
}

impl StructuredLog for ActivationCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            node_id = self.node_id,
            run_id = self.run_id,
            output_ports = self.output_ports,
            scheduled = self.scheduled,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "activation",
            span_name = name,
            node_id = self.node_id,
            run_id = self.run_id,
        )
    }
}

/// Input-only update absorbed values into a node.
///
/// # Log Level
/// `debug!` - Per-node detail
pub struct InputLoaded<'a> {
    pub node_id: &'a str,
    pub ports: &'a [&'a str],
}

impl Display for InputLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded input into node '{}': [{}]",
            self.node_id,
            self.ports.join(", ")
        )
    }
}

impl StructuredLog for InputLoaded<'_> {
    fn log(&self) {
        tracing::debug!(node_id = self.node_id, ports = ?self.ports, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("update_input", span_name = name, node_id = self.node_id)
    }
}

/// Input-only update failed. Only logged; no notification is published.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct InputLoadFailed<'a> {
    pub node_id: &'a str,
    pub error: &'a OperationError,
}

impl Display for InputLoadFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Loading input for node '{}' failed: {}", self.node_id, self.error)
    }
}

impl StructuredLog for InputLoadFailed<'_> {
    fn log(&self) {
        tracing::error!(node_id = self.node_id, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "update_input",
            span_name = name,
            node_id = self.node_id,
            error = %self.error,
        )
    }
}

/// Input-only update requested for a kind that has no input loader.
///
/// # Log Level
/// `warn!` - Likely a wiring mistake in the host
pub struct LoadInputUnbound<'a> {
    pub node_id: &'a str,
    pub kind: &'a str,
}

impl Display for LoadInputUnbound<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' ({}) has no input loader, ignoring update",
            self.node_id, self.kind
        )
    }
}

impl StructuredLog for LoadInputUnbound<'_> {
    fn log(&self) {
        tracing::warn!(node_id = self.node_id, kind = self.kind, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "update_input",
            span_name = name,
            node_id = self.node_id,
            kind = self.kind,
        )
    }
}

/// Wave cancellation requested.
///
/// # Log Level
/// `info!` - Important operational event
pub struct WaveCancelled {
    pub pending: usize,
}

impl Display for WaveCancelled {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Wave cancelled with {} activations in flight", self.pending)
    }
}

impl StructuredLog for WaveCancelled {
    fn log(&self) {
        tracing::info!(pending = self.pending, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("wave", span_name = name, pending = self.pending)
    }
}

/// Every activation of the wave has finished.
///
/// # Log Level
/// `info!` - Important operational event
pub struct WaveDrained {
    pub cancelled: bool,
}

impl Display for WaveDrained {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.cancelled {
            write!(f, "Wave drained after cancellation")
        } else {
            write!(f, "Wave drained")
        }
    }
}

impl StructuredLog for WaveDrained {
    fn log(&self) {
        tracing::info!(cancelled = self.cancelled, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("wave", span_name = name, cancelled = self.cancelled)
    }
}

/// A broadcast notification found no subscriber.
///
/// # Log Level
/// `trace!` - Normal when nobody is listening
pub struct NotificationUndelivered<'a> {
    pub channel: &'a str,
    pub namespace: &'a str,
    pub node_id: &'a str,
}

impl Display for NotificationUndelivered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "No subscribers for {} on '{}' (node '{}')",
            self.channel, self.namespace, self.node_id
        )
    }
}

impl StructuredLog for NotificationUndelivered<'_> {
    fn log(&self) {
        tracing::trace!(
            channel = self.channel,
            namespace = self.namespace,
            node_id = self.node_id,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!(
            "notify",
            span_name = name,
            channel = self.channel,
            namespace = self.namespace,
        )
    }
}
