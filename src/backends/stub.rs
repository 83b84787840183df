// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::engine::{NodeContext, PortValue, PortValues, RequestData};
use crate::errors::OperationError;
use crate::traits::{
    InitOperation, LoadInputOperation, MainOperation, NotificationEvent, NotificationSink,
};

/// One observed call to a recording operation's main
#[derive(Debug, Clone)]
pub struct RecordedRun {
    pub node_id: String,
    pub input_data: PortValues,
    pub triggered_ports: Vec<String>,
    pub request: RequestData,
}

#[derive(Default)]
struct Recorded {
    runs: Vec<RecordedRun>,
    loads: Vec<String>,
    inits: Vec<String>,
}

/// Shared view onto what a [`RecordingOperation`] was asked to do
#[derive(Clone, Default)]
pub struct RecordedCalls {
    inner: Arc<Mutex<Recorded>>,
}

impl RecordedCalls {
    pub fn runs(&self) -> Vec<RecordedRun> {
        self.inner.lock().unwrap().runs.clone()
    }

    pub fn runs_for(&self, node_id: &str) -> Vec<RecordedRun> {
        self.runs()
            .into_iter()
            .filter(|run| run.node_id == node_id)
            .collect()
    }

    pub fn run_count(&self, node_id: &str) -> usize {
        self.runs_for(node_id).len()
    }

    pub fn load_calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().loads.clone()
    }

    pub fn init_calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().inits.clone()
    }
}

/// An operation that records every call and succeeds.
///
/// Main emits the node id as text on `out1`; `load_input` absorbs the
/// request payload into `in1`.
pub struct RecordingOperation {
    calls: RecordedCalls,
    delay: Option<Duration>,
}

impl RecordingOperation {
    pub fn new() -> (Self, RecordedCalls) {
        let calls = RecordedCalls::default();
        (
            Self {
                calls: calls.clone(),
                delay: None,
            },
            calls,
        )
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl MainOperation for RecordingOperation {
    async fn run(
        &self,
        node: &NodeContext,
        request: &RequestData,
    ) -> Result<PortValues, OperationError> {
        self.calls.inner.lock().unwrap().runs.push(RecordedRun {
            node_id: node.id.clone(),
            input_data: node.input_data.clone(),
            triggered_ports: node.triggered_ports.clone(),
            request: request.clone(),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        Ok(PortValues::from([(
            "out1".to_string(),
            PortValue::from(node.id.as_str()),
        )]))
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

#[async_trait]
impl LoadInputOperation for RecordingOperation {
    async fn load_input(
        &self,
        node: &NodeContext,
        request: &RequestData,
    ) -> Result<PortValues, OperationError> {
        self.calls.inner.lock().unwrap().loads.push(node.id.clone());
        Ok(PortValues::from([(
            "in1".to_string(),
            PortValue::from(request.data.as_str()),
        )]))
    }
}

#[async_trait]
impl InitOperation for RecordingOperation {
    async fn init_node(&self, node: &NodeContext) -> Result<(), OperationError> {
        self.calls.inner.lock().unwrap().inits.push(node.id.clone());
        Ok(())
    }
}

/// An operation that always fails
pub struct FailingOperation {
    message: String,
}

impl FailingOperation {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl MainOperation for FailingOperation {
    async fn run(&self, _node: &NodeContext, _request: &RequestData) -> Result<PortValues, OperationError> {
        Err(OperationError::external(self.message.clone()))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

#[async_trait]
impl LoadInputOperation for FailingOperation {
    async fn load_input(
        &self,
        _node: &NodeContext,
        _request: &RequestData,
    ) -> Result<PortValues, OperationError> {
        Err(OperationError::external(self.message.clone()))
    }
}

/// An operation that panics, for crash-isolation tests
pub struct PanickingOperation;

#[async_trait]
impl MainOperation for PanickingOperation {
    async fn run(&self, node: &NodeContext, _request: &RequestData) -> Result<PortValues, OperationError> {
        // mimics an operation making a bad type assumption about its input
        let value = node.input_data.get("in1").and_then(PortValue::as_text);
        panic!("expected text on in1, got {:?}", value.map(str::len));
    }

    fn name(&self) -> &'static str {
        "panicking"
    }
}

/// An initializer that always fails
pub struct FailingInit;

#[async_trait]
impl InitOperation for FailingInit {
    async fn init_node(&self, _node: &NodeContext) -> Result<(), OperationError> {
        Err(OperationError::external("connection refused"))
    }
}

/// Sink that keeps every published event in order
#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<NotificationEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn events_for(&self, node_id: &str) -> Vec<NotificationEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.node_id() == node_id)
            .collect()
    }
}

impl NotificationSink for RecordingSink {
    fn publish(&self, event: NotificationEvent) {
        self.events.lock().unwrap().push(event);
    }
}
