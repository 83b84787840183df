// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Graph vertices and their per-activation state.
//!
//! A [`Node`] splits into an immutable half fixed at graph-build time (id,
//! kind, config, connections, bound operations) and a mutable [`NodeState`]
//! guarded by a mutex. Every read or write of input data, output data,
//! triggered ports and status goes through that lock, so concurrent parents
//! writing into the same node in one wave cannot interleave half-applied
//! updates.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::OperationSet;
use crate::engine::{PortValue, PortValues, RequestData};
use crate::errors::OperationError;

/// Immutable key/value configuration resolved at graph-build time
pub type NodeConfig = HashMap<String, serde_json::Value>;

/// Closed set of node-type tags.
///
/// Serialized with the tag strings used by pipeline definitions
/// (`"StreamIn"`, `"PostgresReader"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    StreamIn,
    StreamOut,
    JsonExtractor,
    DataSync,
    ExecutePythonScript,
    PostgresReader,
    PostgresSqlExecuter,
    PostgresWriter,
    HiveReader,
    HiveExecutor,
}

impl NodeKind {
    pub const ALL: [NodeKind; 10] = [
        NodeKind::StreamIn,
        NodeKind::StreamOut,
        NodeKind::JsonExtractor,
        NodeKind::DataSync,
        NodeKind::ExecutePythonScript,
        NodeKind::PostgresReader,
        NodeKind::PostgresSqlExecuter,
        NodeKind::PostgresWriter,
        NodeKind::HiveReader,
        NodeKind::HiveExecutor,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::StreamIn => "StreamIn",
            NodeKind::StreamOut => "StreamOut",
            NodeKind::JsonExtractor => "JsonExtractor",
            NodeKind::DataSync => "DataSync",
            NodeKind::ExecutePythonScript => "ExecutePythonScript",
            NodeKind::PostgresReader => "PostgresReader",
            NodeKind::PostgresSqlExecuter => "PostgresSqlExecuter",
            NodeKind::PostgresWriter => "PostgresWriter",
            NodeKind::HiveReader => "HiveReader",
            NodeKind::HiveExecutor => "HiveExecutor",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .iter()
            .find(|kind| kind.tag() == s)
            .copied()
            .ok_or_else(|| format!("unknown node kind '{}'", s))
    }
}

/// Externally observable node status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeStatus {
    #[default]
    Idle,
    Running,
    Error,
}

impl NodeStatus {
    /// Wire code used in status notifications
    pub fn code(&self) -> i8 {
        match self {
            NodeStatus::Idle => 0,
            NodeStatus::Running => 1,
            NodeStatus::Error => -1,
        }
    }
}

/// Structured edge target: (downstream node, downstream input port)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeTarget {
    pub node: String,
    pub port: String,
}

impl EdgeTarget {
    pub fn new(node: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            port: port.into(),
        }
    }

    /// Parse the legacy `"<node>-<port>"` form.
    ///
    /// Splits at the last `-` so node ids may themselves contain dashes.
    /// Returns `None` when either side is empty.
    pub fn parse(raw: &str) -> Option<Self> {
        let (node, port) = raw.rsplit_once('-')?;
        if node.is_empty() || port.is_empty() {
            return None;
        }
        Some(Self::new(node, port))
    }
}

impl fmt::Display for EdgeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node, self.port)
    }
}

/// When a node with an empty-payload request is allowed to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessPolicy {
    /// At least one input port holds a value
    #[default]
    #[serde(alias = "any_port")]
    Any,
    /// Every wired input port holds a value
    #[serde(alias = "all_wired_ports")]
    All,
}

impl ReadinessPolicy {
    pub fn tag(&self) -> &'static str {
        match self {
            ReadinessPolicy::Any => "any",
            ReadinessPolicy::All => "all",
        }
    }
}

/// Mutable per-node state, only touched under the node's lock
#[derive(Debug, Default)]
pub struct NodeState {
    pub input_data: PortValues,
    pub output_data: PortValues,
    pub triggered_ports: Vec<String>,
    pub status: NodeStatus,
    run_writes: RunWrites,
}

/// Ports written into a node during one run, in write order.
///
/// Input data outlives a run, so `All` readiness is judged against this
/// record instead. It resets whenever a write arrives under a new run id.
#[derive(Debug, Default)]
struct RunWrites {
    run_id: String,
    ports: Vec<String>,
    scheduled: bool,
}

impl RunWrites {
    fn record(&mut self, run_id: &str, written: &[String]) {
        if self.run_id != run_id {
            *self = RunWrites {
                run_id: run_id.to_string(),
                ..RunWrites::default()
            };
        }
        for port in written {
            if !self.ports.contains(port) {
                self.ports.push(port.clone());
            }
        }
    }
}

impl NodeState {
    fn holds_any_input(&self) -> bool {
        self.input_data.values().any(|v| !v.is_null())
    }

    fn holds_all(&self, ports: &BTreeSet<String>, run_id: &str) -> bool {
        !ports.is_empty()
            && self.run_writes.run_id == run_id
            && ports.iter().all(|port| {
                self.run_writes.ports.contains(port)
                    && self.input_data.get(port).is_some_and(|v| !v.is_null())
            })
    }
}

/// Read-only view of a node handed to its operations
#[derive(Debug, Clone)]
pub struct NodeContext {
    pub id: String,
    pub kind: NodeKind,
    pub config: Arc<NodeConfig>,
    pub input_data: PortValues,
    pub triggered_ports: Vec<String>,
}

impl NodeContext {
    pub fn input(&self, port: &str) -> Option<&PortValue> {
        self.input_data.get(port).filter(|v| !v.is_null())
    }

    pub fn config_value(&self, key: &str) -> Option<&serde_json::Value> {
        self.config.get(key)
    }

    /// String config entry, failing with `InvalidConfig` when absent or not a string
    pub fn config_str(&self, key: &str) -> Result<&str, OperationError> {
        match self.config.get(key) {
            Some(serde_json::Value::String(s)) => Ok(s),
            Some(_) => Err(OperationError::InvalidConfig {
                key: key.to_string(),
                reason: "expected a string".to_string(),
            }),
            None => Err(OperationError::InvalidConfig {
                key: key.to_string(),
                reason: "missing".to_string(),
            }),
        }
    }
}

/// A graph vertex
pub struct Node {
    id: String,
    kind: NodeKind,
    config: Arc<NodeConfig>,
    readiness: ReadinessPolicy,
    pub(crate) port_connects: HashMap<String, Vec<EdgeTarget>>,
    pub(crate) previous_nodes: Vec<String>,
    pub(crate) next_nodes: Vec<String>,
    pub(crate) wired_inputs: BTreeSet<String>,
    operations: OperationSet,
    state: Mutex<NodeState>,
}

impl Node {
    pub fn new(
        id: impl Into<String>,
        kind: NodeKind,
        config: NodeConfig,
        readiness: ReadinessPolicy,
        operations: OperationSet,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            config: Arc::new(config),
            readiness,
            port_connects: HashMap::new(),
            previous_nodes: Vec::new(),
            next_nodes: Vec::new(),
            wired_inputs: BTreeSet::new(),
            operations,
            state: Mutex::new(NodeState::default()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn readiness(&self) -> ReadinessPolicy {
        self.readiness
    }

    pub fn operations(&self) -> &OperationSet {
        &self.operations
    }

    /// Edge targets wired to an output port, in declaration order
    pub fn targets(&self, port: &str) -> &[EdgeTarget] {
        self.port_connects
            .get(port)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn port_connects(&self) -> &HashMap<String, Vec<EdgeTarget>> {
        &self.port_connects
    }

    pub fn previous_nodes(&self) -> &[String] {
        &self.previous_nodes
    }

    pub fn next_nodes(&self) -> &[String] {
        &self.next_nodes
    }

    /// Input ports that at least one upstream edge writes to
    pub fn wired_inputs(&self) -> &BTreeSet<String> {
        &self.wired_inputs
    }

    /// Register an outgoing edge; duplicates on the same port are ignored
    pub(crate) fn connect(&mut self, port: impl Into<String>, target: EdgeTarget) {
        let targets = self.port_connects.entry(port.into()).or_default();
        if !targets.contains(&target) {
            targets.push(target);
        }
    }

    pub async fn status(&self) -> NodeStatus {
        self.state.lock().await.status
    }

    pub async fn input_data(&self) -> PortValues {
        self.state.lock().await.input_data.clone()
    }

    pub async fn output_data(&self) -> PortValues {
        self.state.lock().await.output_data.clone()
    }

    pub async fn triggered_ports(&self) -> Vec<String> {
        self.state.lock().await.triggered_ports.clone()
    }

    /// Readiness check for `request` against the current inputs
    pub async fn is_ready(&self, request: &RequestData) -> bool {
        let state = self.state.lock().await;
        self.ready_under(&state, request)
    }

    fn ready_under(&self, state: &NodeState, request: &RequestData) -> bool {
        if request.has_payload() {
            return true;
        }
        match self.readiness {
            ReadinessPolicy::Any => state.holds_any_input(),
            ReadinessPolicy::All => state.holds_all(&self.wired_inputs, &request.id),
        }
    }

    /// Snapshot of the node for an operation that doesn't change status
    pub async fn context(&self) -> NodeContext {
        let state = self.state.lock().await;
        self.snapshot(&state)
    }

    fn snapshot(&self, state: &NodeState) -> NodeContext {
        NodeContext {
            id: self.id.clone(),
            kind: self.kind,
            config: Arc::clone(&self.config),
            input_data: state.input_data.clone(),
            triggered_ports: state.triggered_ports.clone(),
        }
    }

    /// Readiness check, `Running` transition and input snapshot in one
    /// critical section.
    ///
    /// `triggered` carries the ports written by the parent that spawned this
    /// activation; root activations pass `None` and keep the current value.
    /// Returns `None` (state untouched) when the node is not ready.
    pub(crate) async fn begin_activation(
        &self,
        request: &RequestData,
        triggered: Option<Vec<String>>,
    ) -> Option<NodeContext> {
        let mut state = self.state.lock().await;
        if !self.ready_under(&state, request) {
            return None;
        }
        if let Some(ports) = triggered {
            state.triggered_ports = ports;
        }
        state.status = NodeStatus::Running;
        Some(self.snapshot(&state))
    }

    pub(crate) async fn finish_activation(&self, status: NodeStatus, outputs: Option<PortValues>) {
        let mut state = self.state.lock().await;
        state.status = status;
        state.output_data = outputs.unwrap_or_default();
    }

    pub(crate) async fn set_status(&self, status: NodeStatus) {
        self.state.lock().await.status = status;
    }

    /// Apply every write from one parent activation and run the readiness
    /// check in one critical section.
    ///
    /// Returns the ports the spawned activation should see as triggered, or
    /// `None` when the node should not be activated. Under `Any` those are
    /// the ports this parent wrote. Under `All` they are every port written
    /// in the current run, and only the write that completes the wired set
    /// gets them; later writes in the same run return `None`.
    pub(crate) async fn deliver(
        &self,
        writes: Vec<(String, PortValue)>,
        request: &RequestData,
    ) -> Option<Vec<String>> {
        let mut state = self.state.lock().await;
        let written = apply_writes(&mut state, writes);
        match self.readiness {
            ReadinessPolicy::Any => self.ready_under(&state, request).then_some(written),
            ReadinessPolicy::All => {
                state.run_writes.record(&request.id, &written);
                if state.run_writes.scheduled || !self.ready_under(&state, request) {
                    return None;
                }
                state.run_writes.scheduled = true;
                Some(state.run_writes.ports.clone())
            }
        }
    }

    /// Merge ports absorbed by an input-only update
    pub(crate) async fn absorb_inputs(&self, values: PortValues) {
        let mut state = self.state.lock().await;
        state.input_data.extend(values);
    }
}

fn apply_writes(state: &mut NodeState, writes: Vec<(String, PortValue)>) -> Vec<String> {
    let mut written = Vec::with_capacity(writes.len());
    for (port, value) in writes {
        state.input_data.insert(port.clone(), value);
        if !written.contains(&port) {
            written.push(port);
        }
    }
    written
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("readiness", &self.readiness)
            .field("next_nodes", &self.next_nodes)
            .field("previous_nodes", &self.previous_nodes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::RecordingOperation;

    fn node_with(readiness: ReadinessPolicy, wired: &[&str]) -> Node {
        let (operation, _) = RecordingOperation::new();
        let mut node = Node::new(
            "n1",
            NodeKind::StreamOut,
            NodeConfig::new(),
            readiness,
            OperationSet::new(Arc::new(operation)),
        );
        node.wired_inputs = wired.iter().map(|p| p.to_string()).collect();
        node
    }

    #[test]
    fn test_node_kind_tags_round_trip() {
        for kind in NodeKind::ALL {
            assert_eq!(kind.tag().parse::<NodeKind>().unwrap(), kind);
        }
        assert!("Nope".parse::<NodeKind>().is_err());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(NodeStatus::Idle.code(), 0);
        assert_eq!(NodeStatus::Running.code(), 1);
        assert_eq!(NodeStatus::Error.code(), -1);
    }

    #[test]
    fn test_edge_target_parse_table_driven() {
        struct TestCase {
            raw: &'static str,
            expected: Option<(&'static str, &'static str)>,
        }

        let cases = vec![
            TestCase { raw: "b-in1", expected: Some(("b", "in1")) },
            TestCase { raw: "node-with-dash-in2", expected: Some(("node-with-dash", "in2")) },
            TestCase { raw: "nodash", expected: None },
            TestCase { raw: "-in1", expected: None },
            TestCase { raw: "b-", expected: None },
        ];

        for case in cases {
            let parsed = EdgeTarget::parse(case.raw);
            let expected = case.expected.map(|(n, p)| EdgeTarget::new(n, p));
            assert_eq!(parsed, expected, "parsing '{}'", case.raw);
        }
    }

    #[test]
    fn test_connect_ignores_duplicates() {
        let mut node = node_with(ReadinessPolicy::Any, &[]);
        node.connect("out1", EdgeTarget::new("b", "in1"));
        node.connect("out1", EdgeTarget::new("b", "in1"));
        node.connect("out1", EdgeTarget::new("c", "in1"));

        assert_eq!(
            node.targets("out1"),
            &[EdgeTarget::new("b", "in1"), EdgeTarget::new("c", "in1")]
        );
        assert!(node.targets("out2").is_empty());
    }

    #[tokio::test]
    async fn test_any_port_readiness() {
        let node = node_with(ReadinessPolicy::Any, &["in1", "in2"]);
        let empty = RequestData::default();

        assert!(!node.is_ready(&empty).await);
        assert!(node.is_ready(&RequestData::new("x")).await);

        node.deliver(vec![("in1".into(), PortValue::Null)], &empty).await;
        assert!(!node.is_ready(&empty).await, "null does not count as data");

        node.deliver(vec![("in1".into(), PortValue::from(1i64))], &empty).await;
        assert!(node.is_ready(&empty).await);
    }

    #[tokio::test]
    async fn test_all_wired_readiness() {
        let node = node_with(ReadinessPolicy::All, &["in1", "in2"]);
        let empty = RequestData::default();

        node.deliver(vec![("in1".into(), PortValue::from("a"))], &empty).await;
        assert!(!node.is_ready(&empty).await);

        node.deliver(vec![("in2".into(), PortValue::from("b"))], &empty).await;
        assert!(node.is_ready(&empty).await);
    }

    #[tokio::test]
    async fn test_all_wired_readiness_without_wiring_never_ready() {
        let node = node_with(ReadinessPolicy::All, &[]);
        node.absorb_inputs(PortValues::from([("in1".to_string(), PortValue::from("a"))]))
            .await;
        assert!(!node.is_ready(&RequestData::default()).await);
    }

    #[tokio::test]
    async fn test_deliver_returns_written_ports_in_write_order() {
        let node = node_with(ReadinessPolicy::Any, &[]);
        let written = node
            .deliver(
                vec![
                    ("in1".into(), PortValue::from("a")),
                    ("in2".into(), PortValue::from("b")),
                    ("in1".into(), PortValue::from("c")),
                ],
                &RequestData::default(),
            )
            .await
            .unwrap();

        assert_eq!(written, vec!["in1".to_string(), "in2".to_string()]);
        assert_eq!(node.input_data().await["in1"], PortValue::from("c"));
        assert!(node.triggered_ports().await.is_empty(), "installed when the activation starts");
    }

    #[tokio::test]
    async fn test_deliver_reports_readiness_with_the_write() {
        let node = node_with(ReadinessPolicy::All, &["in1", "in2"]);
        let empty = RequestData::default();

        let first = node.deliver(vec![("in1".into(), PortValue::from("b"))], &empty).await;
        assert_eq!(first, None);

        let second = node.deliver(vec![("in2".into(), PortValue::from("c"))], &empty).await;
        assert_eq!(second, Some(vec!["in1".to_string(), "in2".to_string()]));
        assert!(node.triggered_ports().await.is_empty());
    }

    #[tokio::test]
    async fn test_all_wired_readiness_starts_over_each_run() {
        let node = node_with(ReadinessPolicy::All, &["in1", "in2"]);
        let first_run = RequestData::default().with_id("run-1");
        let second_run = RequestData::default().with_id("run-2");

        node.deliver(vec![("in1".into(), PortValue::from("b"))], &first_run).await;
        let ready = node.deliver(vec![("in2".into(), PortValue::from("c"))], &first_run).await;
        assert!(ready.is_some());

        let stale = node.deliver(vec![("in1".into(), PortValue::from("b2"))], &second_run).await;
        assert_eq!(stale, None, "in2 still holds the value from run-1");
        assert!(!node.is_ready(&second_run).await);

        let ready = node.deliver(vec![("in2".into(), PortValue::from("c2"))], &second_run).await;
        assert_eq!(ready, Some(vec!["in1".to_string(), "in2".to_string()]));
        assert!(node.is_ready(&second_run).await);

        let again = node.deliver(vec![("in1".into(), PortValue::from("b3"))], &second_run).await;
        assert_eq!(again, None, "already scheduled for run-2");
    }

    #[tokio::test]
    async fn test_begin_activation_leaves_state_when_not_ready() {
        let node = node_with(ReadinessPolicy::Any, &[]);
        let ctx = node.begin_activation(&RequestData::default(), None).await;

        assert!(ctx.is_none());
        assert_eq!(node.status().await, NodeStatus::Idle);
    }

    #[tokio::test]
    async fn test_begin_activation_marks_running() {
        let node = node_with(ReadinessPolicy::Any, &[]);
        let ctx = node
            .begin_activation(&RequestData::new("go"), Some(vec!["in1".into()]))
            .await
            .expect("ready with payload");

        assert_eq!(ctx.id, "n1");
        assert_eq!(ctx.triggered_ports, vec!["in1".to_string()]);
        assert_eq!(node.status().await, NodeStatus::Running);
    }

    #[test]
    fn test_config_str() {
        let mut config = NodeConfig::new();
        config.insert("path".into(), serde_json::json!("a.b"));
        config.insert("limit".into(), serde_json::json!(3));
        let ctx = NodeContext {
            id: "n".into(),
            kind: NodeKind::JsonExtractor,
            config: Arc::new(config),
            input_data: PortValues::new(),
            triggered_ports: vec![],
        };

        assert_eq!(ctx.config_str("path").unwrap(), "a.b");
        assert!(matches!(ctx.config_str("limit"), Err(OperationError::InvalidConfig { .. })));
        assert!(matches!(ctx.config_str("missing"), Err(OperationError::InvalidConfig { .. })));
    }
}
