// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The trigger engine: one node activation and its fan-out.
//!
//! An activation checks cancellation, checks readiness, runs the node's
//! bound `main` in its own task on the wave's tracker, then writes every output value into the
//! connected input ports and spawns an activation for each downstream node
//! that became ready. Downstream activations are registered on the wave's
//! [`TaskTracker`] before they are spawned, so the wave cannot be observed
//! as drained while work is still being scheduled.
//!
//! Failures never cross activation boundaries: an error or a panic in one
//! node sets that node's status to `Error`, publishes a status/error pair,
//! and ends that branch of the wave.

use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::Instrument;

use crate::engine::{Graph, Node, NodeStatus, PortValue, PortValues, RequestData};
use crate::errors::OperationError;
use crate::observability::messages::engine::{
    ActivationCancelled, ActivationCompleted, ActivationFailed, ActivationStarted,
    FanOutScheduled, InputLoadFailed, InputLoaded, LoadInputUnbound, NodeNotReady,
    OperationCrashed,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{NotificationEvent, NotificationSink};

/// Everything an activation shares with the rest of its wave.
///
/// Cloning is cheap; every field is a handle.
#[derive(Clone)]
pub struct ActivationContext {
    pub graph: Arc<Graph>,
    pub sink: Arc<dyn NotificationSink>,
    pub tracker: TaskTracker,
    pub cancel: CancellationToken,
}

pub type Activation = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Activate `node` for `request`.
///
/// `triggered` is the set of ports the spawning parent just wrote; root
/// activations pass `None`. The returned future is meant to be spawned on
/// `ctx.tracker`. Everything it logs, including the operation's own events,
/// sits inside an `activation` span carrying the node and run ids.
pub fn run(
    ctx: ActivationContext,
    node: Arc<Node>,
    request: RequestData,
    triggered: Option<Vec<String>>,
) -> Activation {
    let span = ActivationStarted {
        node_id: node.id(),
        kind: node.kind().tag(),
        run_id: &request.id,
        triggered_ports: triggered.as_deref().unwrap_or(&[]),
    }
    .span("run");

    let activation = async move {
        if ctx.cancel.is_cancelled() {
            ActivationCancelled {
                node_id: node.id(),
                run_id: &request.id,
            }
            .log();
            return;
        }

        let Some(context) = node.begin_activation(&request, triggered).await else {
            NodeNotReady {
                node_id: node.id(),
                run_id: &request.id,
                readiness: node.readiness().tag(),
            }
            .log();
            return;
        };

        ActivationStarted {
            node_id: node.id(),
            kind: node.kind().tag(),
            run_id: &request.id,
            triggered_ports: &context.triggered_ports,
        }
        .log();

        let main = Arc::clone(&node.operations().main);
        let operation = main.name();
        let task_request = request.clone();
        let outcome = ctx
            .tracker
            .spawn(async move { main.run(&context, &task_request).await }.in_current_span())
            .await
            .unwrap_or_else(|join_error| {
                let reason = crash_reason(join_error);
                OperationCrashed {
                    node_id: node.id(),
                    operation,
                    reason: &reason,
                }
                .log();
                Err(OperationError::Crashed(reason))
            });

        match outcome {
            Ok(outputs) => complete(&ctx, &node, &request, outputs).await,
            Err(error) => fail(&ctx, &node, &request, error).await,
        }
    };
    Box::pin(activation.instrument(span))
}

async fn fail(ctx: &ActivationContext, node: &Node, request: &RequestData, error: OperationError) {
    node.finish_activation(NodeStatus::Error, None).await;
    ActivationFailed {
        node_id: node.id(),
        run_id: &request.id,
        error: &error,
    }
    .log();
    ctx.sink
        .publish(NotificationEvent::status(node.id(), NodeStatus::Error));
    ctx.sink
        .publish(NotificationEvent::error(node.id(), error.to_string()));
}

async fn complete(ctx: &ActivationContext, node: &Node, request: &RequestData, outputs: PortValues) {
    let output_ports = outputs.len();
    let writes = plan_writes(node, &outputs);
    node.finish_activation(NodeStatus::Running, Some(outputs)).await;

    let child_request = request.derived();
    let mut ready = Vec::with_capacity(writes.len());
    for (target_id, target_writes) in writes {
        let Some(target) = ctx.graph.node(&target_id) else {
            continue;
        };
        if let Some(ports) = target.deliver(target_writes, &child_request).await {
            ready.push((Arc::clone(target), ports));
        }
    }

    let scheduled = ready.len();
    for (target, ports) in ready {
        FanOutScheduled {
            source: node.id(),
            target: target.id(),
            ports: &ports,
        }
        .log();
        ctx.tracker.spawn(run(
            ctx.clone(),
            target,
            child_request.clone(),
            Some(ports),
        ));
    }

    node.set_status(NodeStatus::Idle).await;
    ActivationCompleted {
        node_id: node.id(),
        run_id: &request.id,
        output_ports,
        scheduled,
    }
    .log();
    ctx.sink
        .publish(NotificationEvent::status(node.id(), NodeStatus::Idle));
}

/// Group every (port, value) write by downstream node, keeping the order in
/// which each downstream node was first written.
///
/// Output ports are visited in name order; ports without connections
/// contribute nothing.
fn plan_writes(node: &Node, outputs: &PortValues) -> Vec<(String, Vec<(String, PortValue)>)> {
    let mut ports: Vec<&String> = outputs.keys().collect();
    ports.sort();

    let mut writes: Vec<(String, Vec<(String, PortValue)>)> = Vec::new();
    for port in ports {
        let value = &outputs[port];
        for target in node.targets(port) {
            let index = match writes.iter().position(|(id, _)| *id == target.node) {
                Some(index) => index,
                None => {
                    writes.push((target.node.clone(), Vec::new()));
                    writes.len() - 1
                }
            };
            writes[index].1.push((target.port.clone(), value.clone()));
        }
    }
    writes
}

/// Absorb external input into `node` without activating it.
///
/// Never writes downstream and never publishes notifications; failures and
/// a missing input loader are only logged.
pub async fn update_input(ctx: ActivationContext, node: Arc<Node>, request: RequestData) {
    if ctx.cancel.is_cancelled() {
        ActivationCancelled {
            node_id: node.id(),
            run_id: &request.id,
        }
        .log();
        return;
    }

    let Some(loader) = node.operations().load_input.clone() else {
        LoadInputUnbound {
            node_id: node.id(),
            kind: node.kind().tag(),
        }
        .log();
        return;
    };

    let context = node.context().await;
    let loaded = ctx
        .tracker
        .spawn(async move { loader.load_input(&context, &request).await }.in_current_span())
        .await
        .unwrap_or_else(|join_error| {
            let reason = crash_reason(join_error);
            OperationCrashed {
                node_id: node.id(),
                operation: "load_input",
                reason: &reason,
            }
            .log();
            Err(OperationError::Crashed(reason))
        });

    match loaded {
        Ok(values) => {
            let mut ports: Vec<&str> = values.keys().map(String::as_str).collect();
            ports.sort();
            InputLoaded {
                node_id: node.id(),
                ports: &ports,
            }
            .log();
            node.absorb_inputs(values).await;
        }
        Err(error) => InputLoadFailed {
            node_id: node.id(),
            error: &error,
        }
        .log(),
    }
}

fn crash_reason(join_error: JoinError) -> String {
    if join_error.is_cancelled() {
        return "operation task was aborted".to_string();
    }
    panic_message(join_error.into_panic())
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "operation panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{
        FailingOperation, PanickingOperation, RecordingOperation, RecordingSink,
    };
    use crate::config::{EngineOptions, NodeDefinition, OperationRegistry, OperationSet, PipelineConfig};
    use crate::engine::NodeKind;
    use std::time::Duration;

    fn context(graph: Graph, sink: &RecordingSink) -> ActivationContext {
        ActivationContext {
            graph: Arc::new(graph),
            sink: Arc::new(sink.clone()),
            tracker: TaskTracker::new(),
            cancel: CancellationToken::new(),
        }
    }

    fn fan_out_config() -> PipelineConfig {
        PipelineConfig {
            engine: EngineOptions::default(),
            nodes: vec![
                NodeDefinition::new("a", NodeKind::StreamIn)
                    .connect("out1", "b", "in1")
                    .connect("out2", "b", "in2")
                    .connect("out1", "c", "in1"),
                NodeDefinition::new("b", NodeKind::StreamOut),
                NodeDefinition::new("c", NodeKind::StreamOut),
            ],
        }
    }

    #[test]
    fn test_plan_writes_groups_by_target_in_first_write_order() {
        let (operation, _) = RecordingOperation::new();
        let set = OperationSet::new(Arc::new(operation));
        let registry = OperationRegistry::builder()
            .register(NodeKind::StreamIn, set.clone())
            .register(NodeKind::StreamOut, set)
            .build();
        let graph = Graph::build(&fan_out_config(), &registry).unwrap();
        let a = graph.node("a").unwrap();

        let outputs = PortValues::from([
            ("out1".to_string(), PortValue::from("x")),
            ("out2".to_string(), PortValue::from(2_i64)),
            ("unwired".to_string(), PortValue::from("ignored")),
        ]);
        let writes = plan_writes(a, &outputs);

        let targets: Vec<&str> = writes.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(targets, vec!["b", "c"]);
        assert_eq!(
            writes[0].1,
            vec![
                ("in1".to_string(), PortValue::from("x")),
                ("in2".to_string(), PortValue::from(2_i64)),
            ]
        );
        assert_eq!(writes[1].1, vec![("in1".to_string(), PortValue::from("x"))]);
    }

    #[tokio::test]
    async fn test_run_failure_publishes_status_then_error() {
        let registry = OperationRegistry::builder()
            .register(
                NodeKind::StreamIn,
                OperationSet::new(Arc::new(FailingOperation::new("db down"))),
            )
            .build();
        let config = PipelineConfig {
            engine: EngineOptions::default(),
            nodes: vec![NodeDefinition::new("a", NodeKind::StreamIn)],
        };
        let sink = RecordingSink::new();
        let ctx = context(Graph::build(&config, &registry).unwrap(), &sink);
        let a = Arc::clone(ctx.graph.node("a").unwrap());

        run(ctx, Arc::clone(&a), RequestData::new("go"), None).await;

        assert_eq!(a.status().await, NodeStatus::Error);
        assert_eq!(
            sink.events(),
            vec![
                NotificationEvent::status("a", NodeStatus::Error),
                NotificationEvent::error("a", "db down"),
            ]
        );
    }

    #[tokio::test]
    async fn test_run_contains_panics() {
        let registry = OperationRegistry::builder()
            .register(NodeKind::StreamIn, OperationSet::new(Arc::new(PanickingOperation)))
            .build();
        let config = PipelineConfig {
            engine: EngineOptions::default(),
            nodes: vec![NodeDefinition::new("a", NodeKind::StreamIn)],
        };
        let sink = RecordingSink::new();
        let ctx = context(Graph::build(&config, &registry).unwrap(), &sink);
        let a = Arc::clone(ctx.graph.node("a").unwrap());

        run(ctx, Arc::clone(&a), RequestData::new("go"), None).await;

        assert_eq!(a.status().await, NodeStatus::Error);
        let events = sink.events();
        assert_eq!(events.len(), 2);
        match &events[1] {
            NotificationEvent::Error { message, .. } => {
                assert!(message.starts_with("operation crashed: expected text on in1"))
            }
            other => panic!("expected an error event, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_input_without_loader_is_a_no_op() {
        let (operation, calls) = RecordingOperation::new();
        let registry = OperationRegistry::builder()
            .register(NodeKind::StreamOut, OperationSet::new(Arc::new(operation)))
            .build();
        let config = PipelineConfig {
            engine: EngineOptions::default(),
            nodes: vec![NodeDefinition::new("a", NodeKind::StreamOut)],
        };
        let sink = RecordingSink::new();
        let ctx = context(Graph::build(&config, &registry).unwrap(), &sink);
        let a = Arc::clone(ctx.graph.node("a").unwrap());

        update_input(ctx, Arc::clone(&a), RequestData::new("buffered")).await;

        assert!(a.input_data().await.is_empty());
        assert!(calls.load_calls().is_empty());
        assert!(sink.events().is_empty());
    }

    /// Records the name and `run_id` field presence of every opened span
    #[derive(Clone, Default)]
    struct SpanRecorder {
        spans: Arc<std::sync::Mutex<Vec<(String, bool)>>>,
    }

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for SpanRecorder {
        fn on_new_span(
            &self,
            attrs: &tracing::span::Attributes<'_>,
            _id: &tracing::span::Id,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            let metadata = attrs.metadata();
            self.spans.lock().unwrap().push((
                metadata.name().to_string(),
                metadata.fields().field("run_id").is_some(),
            ));
        }
    }

    #[tokio::test]
    async fn test_run_opens_an_activation_span() {
        use tracing_subscriber::layer::SubscriberExt;

        let recorder = SpanRecorder::default();
        let _guard = tracing::subscriber::set_default(
            tracing_subscriber::registry().with(recorder.clone()),
        );

        let (operation, _) = RecordingOperation::new();
        let registry = OperationRegistry::builder()
            .register(NodeKind::StreamIn, OperationSet::new(Arc::new(operation)))
            .build();
        let config = PipelineConfig {
            engine: EngineOptions::default(),
            nodes: vec![NodeDefinition::new("a", NodeKind::StreamIn)],
        };
        let ctx = context(Graph::build(&config, &registry).unwrap(), &RecordingSink::new());
        let a = Arc::clone(ctx.graph.node("a").unwrap());

        run(ctx, a, RequestData::new("go").with_id("run-7"), None).await;

        let spans = recorder.spans.lock().unwrap().clone();
        assert!(
            spans.contains(&("activation".to_string(), true)),
            "spans opened: {:?}",
            spans
        );
    }

    #[tokio::test]
    async fn test_operation_task_is_tracked_while_running() {
        let (operation, calls) = RecordingOperation::new();
        let operation = operation.with_delay(Duration::from_millis(100));
        let registry = OperationRegistry::builder()
            .register(NodeKind::StreamIn, OperationSet::new(Arc::new(operation)))
            .build();
        let config = PipelineConfig {
            engine: EngineOptions::default(),
            nodes: vec![NodeDefinition::new("a", NodeKind::StreamIn)],
        };
        let ctx = context(Graph::build(&config, &registry).unwrap(), &RecordingSink::new());
        let a = Arc::clone(ctx.graph.node("a").unwrap());
        let tracker = ctx.tracker.clone();

        tracker.spawn(run(ctx, a, RequestData::new("go"), None));
        while calls.run_count("a") == 0 {
            tokio::task::yield_now().await;
        }

        assert_eq!(tracker.len(), 2, "activation and its operation task");
        tracker.close();
        tracker.wait().await;
        assert_eq!(tracker.len(), 0);
    }

    #[test]
    fn test_panic_message_table_driven() {
        struct TestCase {
            payload: Box<dyn Any + Send>,
            expected: &'static str,
        }

        let test_cases = vec![
            TestCase { payload: Box::new("static"), expected: "static" },
            TestCase { payload: Box::new("owned".to_string()), expected: "owned" },
            TestCase { payload: Box::new(42_u8), expected: "operation panicked" },
        ];

        for case in test_cases {
            assert_eq!(panic_message(case.payload), case.expected);
        }
    }
}
