//! Configuration validation for pipeline graph integrity.
//!
//! The engine trusts the graph it is given: it never checks that an edge
//! target exists or that fan-out terminates. Those guarantees are
//! established here, before a graph is built.
//!
//! # Validation Pipeline
//!
//! 1. **Uniqueness Validation**: every node id appears once
//! 2. **Target Validation**: every connection parses and names an existing node
//! 3. **Cycle Detection**: DFS over the connection graph
//!
//! Cycle detection needs a structurally valid graph, so it only runs when the
//! first two stages pass.
//!
//! # Example
//! ```rust
//! use pipeflow::config::{validate_graph, NodeDefinition, PipelineConfig, EngineOptions};
//! use pipeflow::engine::NodeKind;
//!
//! let config = PipelineConfig {
//!     engine: EngineOptions::default(),
//!     nodes: vec![
//!         NodeDefinition::new("a", NodeKind::StreamIn).connect("out1", "b", "in1"),
//!         NodeDefinition::new("b", NodeKind::StreamOut),
//!     ],
//! };
//!
//! assert!(validate_graph(&config).is_ok());
//! ```

use std::collections::{HashMap, HashSet};

use crate::config::PipelineConfig;
use crate::errors::ValidationError;
use crate::observability::messages::validation::{
    CyclicGraphDetected, DuplicateNodeIdDetected, UnresolvedTargetDetected,
};
use crate::observability::messages::StructuredLog;

/// Validates a pipeline config for structural integrity.
///
/// Errors are accumulated so a config author sees every problem at once.
///
/// # Returns
///
/// * `Ok(())` - The graph can be built
/// * `Err(Vec<ValidationError>)` - Every problem found
pub fn validate_graph(config: &PipelineConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(duplicate_errors) = validate_unique_node_ids(config) {
        errors.extend(duplicate_errors);
    }

    if let Err(target_errors) = validate_connection_targets(config) {
        errors.extend(target_errors);
    }

    if errors.is_empty() {
        if let Err(cycle_errors) = validate_acyclic_graph(config) {
            errors.extend(cycle_errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_unique_node_ids(config: &PipelineConfig) -> Result<(), Vec<ValidationError>> {
    let mut seen_ids = HashSet::new();
    let mut errors = Vec::new();

    for node in &config.nodes {
        if !seen_ids.insert(&node.id) {
            DuplicateNodeIdDetected { node_id: &node.id }.log();
            errors.push(ValidationError::DuplicateNodeId {
                node_id: node.id.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Every connection must parse and point at a node declared in the config.
///
/// Ports themselves are not checked: input ports are implicit and come into
/// existence when first written.
fn validate_connection_targets(config: &PipelineConfig) -> Result<(), Vec<ValidationError>> {
    let node_ids: HashSet<&str> = config.nodes.iter().map(|n| n.id.as_str()).collect();
    let mut errors = Vec::new();

    for node in &config.nodes {
        let mut ports: Vec<&String> = node.connections.keys().collect();
        ports.sort();
        for port in ports {
            for target in &node.connections[port] {
                match target.resolve() {
                    Some(edge) if node_ids.contains(edge.node.as_str()) => {}
                    Some(edge) => {
                        UnresolvedTargetDetected {
                            node_id: &node.id,
                            port,
                            missing_node: &edge.node,
                        }
                        .log();
                        errors.push(ValidationError::UnresolvedTarget {
                            node_id: node.id.clone(),
                            port: port.clone(),
                            missing_node: edge.node,
                        });
                    }
                    None => errors.push(ValidationError::MalformedTarget {
                        node_id: node.id.clone(),
                        target: target.raw(),
                    }),
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Fan-out follows every edge, so a cycle would keep a wave alive forever.
fn validate_acyclic_graph(config: &PipelineConfig) -> Result<(), Vec<ValidationError>> {
    let mut graph: HashMap<&str, Vec<String>> = HashMap::new();
    for node in &config.nodes {
        let mut next: Vec<String> = node
            .connections
            .values()
            .flatten()
            .filter_map(|t| t.resolve())
            .map(|t| t.node)
            .collect();
        next.sort();
        next.dedup();
        graph.insert(node.id.as_str(), next);
    }

    let mut visited = HashSet::new();
    let mut rec_stack = HashSet::new();
    let mut path = Vec::new();

    for node in &config.nodes {
        if !visited.contains(&node.id) {
            if let Some(cycle) =
                dfs_cycle_detection(&node.id, &graph, &mut visited, &mut rec_stack, &mut path)
            {
                let cycle_refs: Vec<&str> = cycle.iter().map(String::as_str).collect();
                CyclicGraphDetected { cycle: &cycle_refs }.log();
                return Err(vec![ValidationError::CyclicGraph { cycle }]);
            }
        }
    }

    Ok(())
}

/// Three-color DFS; returns the cycle path (first node repeated) on a back edge.
fn dfs_cycle_detection(
    node: &str,
    graph: &HashMap<&str, Vec<String>>,
    visited: &mut HashSet<String>,
    rec_stack: &mut HashSet<String>,
    path: &mut Vec<String>,
) -> Option<Vec<String>> {
    visited.insert(node.to_string());
    rec_stack.insert(node.to_string());
    path.push(node.to_string());

    if let Some(neighbors) = graph.get(node) {
        for neighbor in neighbors {
            if !visited.contains(neighbor) {
                if let Some(cycle) = dfs_cycle_detection(neighbor, graph, visited, rec_stack, path) {
                    return Some(cycle);
                }
            } else if rec_stack.contains(neighbor) {
                if let Some(cycle_start) = path.iter().position(|x| x == neighbor) {
                    let mut cycle = path[cycle_start..].to_vec();
                    cycle.push(neighbor.clone());
                    return Some(cycle);
                }
            }
        }
    }

    rec_stack.remove(node);
    path.pop();
    None
}
