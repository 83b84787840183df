// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{validate_graph, OperationRegistry, PipelineConfig};
use crate::engine::Node;
use crate::errors::GraphError;
use crate::observability::messages::engine::{GraphBuilt, NodeInitFailed, NodeInitialized};
use crate::observability::messages::StructuredLog;

/// Owns every node of a pipeline.
///
/// Edges are navigational only: nodes refer to their neighbours by id and
/// the graph resolves them.
#[derive(Debug, Default)]
pub struct Graph {
    nodes: HashMap<String, Arc<Node>>,
    order: Vec<String>,
}

impl Graph {
    /// Validate `config`, bind each node's operations from `registry` and
    /// wire the edges.
    pub fn build(config: &PipelineConfig, registry: &OperationRegistry) -> Result<Self, GraphError> {
        validate_graph(config).map_err(GraphError::Invalid)?;

        let mut nodes: HashMap<String, Node> = HashMap::with_capacity(config.nodes.len());
        let mut order = Vec::with_capacity(config.nodes.len());

        for def in &config.nodes {
            let operations = registry
                .resolve(def.kind)
                .cloned()
                .ok_or_else(|| GraphError::UnboundOperation {
                    node_id: def.id.clone(),
                    kind: def.kind,
                })?;
            let readiness = def.readiness.unwrap_or(config.engine.readiness);
            nodes.insert(
                def.id.clone(),
                Node::new(def.id.clone(), def.kind, def.config.clone(), readiness, operations),
            );
            order.push(def.id.clone());
        }

        let mut edge_count = 0;
        for def in &config.nodes {
            let mut ports: Vec<&String> = def.connections.keys().collect();
            ports.sort();

            for port in ports {
                // validation already rejected malformed and dangling targets
                for target in def.connections[port].iter().filter_map(|t| t.resolve()) {
                    if let Some(downstream) = nodes.get_mut(&target.node) {
                        downstream.wired_inputs.insert(target.port.clone());
                        if !downstream.previous_nodes.contains(&def.id) {
                            downstream.previous_nodes.push(def.id.clone());
                        }
                    }
                    if let Some(source) = nodes.get_mut(&def.id) {
                        if !source.next_nodes.contains(&target.node) {
                            source.next_nodes.push(target.node.clone());
                        }
                        source.connect(port.clone(), target);
                    }
                    edge_count += 1;
                }
            }
        }

        GraphBuilt {
            node_count: order.len(),
            edge_count,
        }
        .log();

        Ok(Self {
            nodes: nodes
                .into_iter()
                .map(|(id, node)| (id, Arc::new(node)))
                .collect(),
            order,
        })
    }

    /// Run every bound initializer once, in declaration order.
    ///
    /// Stops at the first failure.
    pub async fn initialize(&self) -> Result<(), GraphError> {
        for node in self.nodes() {
            let Some(init) = node.operations().init_node.clone() else {
                continue;
            };
            let context = node.context().await;
            if let Err(source) = init.init_node(&context).await {
                NodeInitFailed {
                    node_id: node.id(),
                    kind: node.kind().tag(),
                    error: &source,
                }
                .log();
                return Err(GraphError::InitFailed {
                    node_id: node.id().to_string(),
                    source,
                });
            }
            NodeInitialized {
                node_id: node.id(),
                kind: node.kind().tag(),
            }
            .log();
        }
        Ok(())
    }

    pub fn node(&self, id: &str) -> Option<&Arc<Node>> {
        self.nodes.get(id)
    }

    /// Nodes in declaration order
    pub fn nodes(&self) -> impl Iterator<Item = &Arc<Node>> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Nodes nothing connects into
    pub fn roots(&self) -> Vec<&Arc<Node>> {
        self.nodes()
            .filter(|node| node.previous_nodes().is_empty())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
