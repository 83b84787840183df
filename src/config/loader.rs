// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::DEFAULT_NAMESPACE;
use crate::engine::{EdgeTarget, NodeConfig, NodeKind, ReadinessPolicy};
use crate::errors::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Complete definition of a pipeline graph.
///
/// Typically loaded from a YAML file.
///
/// # Example
/// ```yaml
/// engine:
///   readiness: any
///   namespace: "/"
/// nodes:
///   - id: source
///     type: StreamIn
///     connections:
///       out1:
///         - { node: extract, port: in1 }
///   - id: extract
///     type: JsonExtractor
///     config:
///       path: "user.name"
///     connections:
///       out1: ["sink-in1"]
///   - id: sink
///     type: StreamOut
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub engine: EngineOptions,
    pub nodes: Vec<NodeDefinition>,
}

/// Graph-wide engine options
#[derive(Debug, Clone, Deserialize)]
pub struct EngineOptions {
    /// Default readiness policy for nodes that don't set one
    #[serde(default)]
    pub readiness: ReadinessPolicy,
    /// Namespace notifications are broadcast to
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            readiness: ReadinessPolicy::default(),
            namespace: default_namespace(),
        }
    }
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

/// Configuration for a single node.
///
/// # Fields
/// * `id` - Unique identifier within the graph
/// * `kind` - Node-type tag selecting the bound operations
/// * `config` - Free-form configuration handed to the operations
/// * `readiness` - Per-node readiness override
/// * `connections` - Output port -> downstream targets
#[derive(Debug, Clone, Deserialize)]
pub struct NodeDefinition {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub config: NodeConfig,
    #[serde(default)]
    pub readiness: Option<ReadinessPolicy>,
    #[serde(default)]
    pub connections: HashMap<String, Vec<ConnectionTarget>>,
}

impl NodeDefinition {
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            config: NodeConfig::new(),
            readiness: None,
            connections: HashMap::new(),
        }
    }

    pub fn connect(mut self, port: impl Into<String>, node: &str, target_port: &str) -> Self {
        self.connections
            .entry(port.into())
            .or_default()
            .push(ConnectionTarget::Structured(EdgeTarget::new(node, target_port)));
        self
    }

    pub fn with_config(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.config.insert(key.into(), value);
        self
    }

    pub fn with_readiness(mut self, readiness: ReadinessPolicy) -> Self {
        self.readiness = Some(readiness);
        self
    }
}

/// A connection target as written in config: structured, or the legacy
/// `"<node>-<port>"` string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ConnectionTarget {
    Structured(EdgeTarget),
    Legacy(String),
}

impl ConnectionTarget {
    /// Resolve into an edge descriptor; `None` for a malformed legacy string
    pub fn resolve(&self) -> Option<EdgeTarget> {
        match self {
            ConnectionTarget::Structured(target) => Some(target.clone()),
            ConnectionTarget::Legacy(raw) => EdgeTarget::parse(raw),
        }
    }

    pub fn raw(&self) -> String {
        match self {
            ConnectionTarget::Structured(target) => format!("{}-{}", target.node, target.port),
            ConnectionTarget::Legacy(raw) => raw.clone(),
        }
    }
}

/// Parse a config from YAML text
pub fn parse_config(content: &str) -> Result<PipelineConfig, ConfigError> {
    Ok(serde_yaml::from_str(content)?)
}

/// Load a config from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Load and validate a config from a YAML file
///
/// Validation checks id uniqueness, connection targets and acyclicity;
/// all problems found are reported together.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig, ConfigError> {
    let cfg = load_config(path)?;
    crate::config::validate_graph(&cfg).map_err(ConfigError::Invalid)?;
    Ok(cfg)
}
