// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::engine::trigger::{self, ActivationContext};
use crate::engine::{Graph, Node, RequestData};
use crate::errors::EngineError;
use crate::observability::messages::engine::{WaveCancelled, WaveDrained};
use crate::observability::messages::StructuredLog;
use crate::traits::NotificationSink;

/// One propagation run over a graph.
///
/// Every activation, root or fan-out, is a task on the wave's tracker, so
/// [`Wave::wait`] returns only once the whole reachable subgraph has
/// settled. Cancellation is cooperative: activations already running finish,
/// activations that have not started yet do nothing.
///
/// # Example
/// ```no_run
/// # async fn demo(graph: pipeflow::engine::Graph) -> Result<(), pipeflow::errors::EngineError> {
/// use std::sync::Arc;
/// use pipeflow::backends::notify::NullSink;
/// use pipeflow::engine::{RequestData, Wave};
///
/// let wave = Wave::new(Arc::new(graph), Arc::new(NullSink));
/// wave.trigger("source", RequestData::new("{\"user\":{\"name\":\"ada\"}}"))?;
/// wave.wait().await;
/// # Ok(())
/// # }
/// ```
pub struct Wave {
    ctx: ActivationContext,
}

impl Wave {
    pub fn new(graph: Arc<Graph>, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            ctx: ActivationContext {
                graph,
                sink,
                tracker: TaskTracker::new(),
                cancel: CancellationToken::new(),
            },
        }
    }

    /// Share an externally owned cancellation token, e.g. one per host shutdown
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.ctx.cancel = token;
        self
    }

    pub fn graph(&self) -> &Arc<Graph> {
        &self.ctx.graph
    }

    /// Start a root activation of `node_id`
    pub fn trigger(&self, node_id: &str, request: RequestData) -> Result<(), EngineError> {
        let node = self.lookup(node_id)?;
        self.ctx
            .tracker
            .spawn(trigger::run(self.ctx.clone(), node, request, None));
        Ok(())
    }

    /// Feed external input into `node_id` without activating it
    pub fn update_input(&self, node_id: &str, request: RequestData) -> Result<(), EngineError> {
        let node = self.lookup(node_id)?;
        self.ctx
            .tracker
            .spawn(trigger::update_input(self.ctx.clone(), node, request));
        Ok(())
    }

    pub fn cancel(&self) {
        WaveCancelled {
            pending: self.pending(),
        }
        .log();
        self.ctx.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.ctx.cancel.is_cancelled()
    }

    /// Activations spawned and not yet finished
    pub fn pending(&self) -> usize {
        self.ctx.tracker.len()
    }

    /// Wait for every activation of the wave to finish.
    ///
    /// Outcomes are only observable through the notification sink. Running
    /// activations may still spawn children after this is called; those are
    /// waited for as well.
    pub async fn wait(&self) {
        self.ctx.tracker.close();
        self.ctx.tracker.wait().await;
        WaveDrained {
            cancelled: self.is_cancelled(),
        }
        .log();
    }

    fn lookup(&self, node_id: &str) -> Result<Arc<Node>, EngineError> {
        self.ctx
            .graph
            .node(node_id)
            .cloned()
            .ok_or_else(|| EngineError::UnknownNode(node_id.to_string()))
    }
}
