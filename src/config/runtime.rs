// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::backends::notify::BroadcastSink;
use crate::config::{OperationRegistry, PipelineConfig};
use crate::engine::{Graph, Wave};
use crate::errors::GraphError;

/// A built, initialized graph and the sink its waves publish to.
pub struct Runtime {
    pub graph: Arc<Graph>,
    pub sink: BroadcastSink,
}

impl Runtime {
    /// Start a new wave over the graph; every wave shares the runtime's sink
    pub fn wave(&self) -> Wave {
        Wave::new(Arc::clone(&self.graph), Arc::new(self.sink.clone()))
    }
}

/// Runtime builder - orchestrates graph assembly and node initialization from configuration.
///
/// # Examples
///
/// ```
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// use pipeflow::config::{parse_config, OperationRegistry, RuntimeBuilder};
///
/// let config = parse_config(r#"
/// nodes:
///   - id: source
///     type: StreamIn
///     connections:
///       out1: ["sink-in1"]
///   - id: sink
///     type: StreamOut
/// "#).unwrap();
///
/// let runtime = RuntimeBuilder::from_config(&config, &OperationRegistry::with_builtins())
///     .await
///     .unwrap();
/// assert_eq!(runtime.graph.len(), 2);
/// assert_eq!(runtime.sink.namespace(), "/");
/// # });
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Build the graph, run every node initializer and open a broadcast sink
    /// on the configured namespace.
    pub async fn from_config(
        cfg: &PipelineConfig,
        registry: &OperationRegistry,
    ) -> Result<Runtime, GraphError> {
        let graph = Graph::build(cfg, registry)?;
        graph.initialize().await?;
        Ok(Runtime {
            graph: Arc::new(graph),
            sink: BroadcastSink::new(cfg.engine.namespace.clone()),
        })
    }
}
