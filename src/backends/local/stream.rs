// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::engine::{NodeContext, PortValue, PortValues, RequestData};
use crate::errors::OperationError;
use crate::traits::{LoadInputOperation, MainOperation};

const IN_PORT: &str = "in1";
const OUT_PORT: &str = "out1";

/// Entry point of a pipeline.
///
/// `main` emits the request payload on `out1`. When the activation carries
/// no payload, the value previously buffered into `in1` by `load_input` is
/// emitted instead.
pub struct StreamInOperation;

#[async_trait]
impl MainOperation for StreamInOperation {
    async fn run(&self, node: &NodeContext, request: &RequestData) -> Result<PortValues, OperationError> {
        let value = if request.has_payload() {
            PortValue::from(request.data.as_str())
        } else {
            node.input(IN_PORT)
                .cloned()
                .ok_or_else(|| OperationError::invalid_input("no payload and nothing buffered on in1"))?
        };
        Ok(PortValues::from([(OUT_PORT.to_string(), value)]))
    }

    fn name(&self) -> &'static str {
        "stream_in"
    }
}

#[async_trait]
impl LoadInputOperation for StreamInOperation {
    async fn load_input(&self, _node: &NodeContext, request: &RequestData) -> Result<PortValues, OperationError> {
        if !request.has_payload() {
            return Err(OperationError::invalid_input("update carries no payload"));
        }
        Ok(PortValues::from([(
            IN_PORT.to_string(),
            PortValue::from(request.data.as_str()),
        )]))
    }
}

/// Exit point of a pipeline: forwards `in1` to `out1` unchanged.
pub struct StreamOutOperation;

#[async_trait]
impl MainOperation for StreamOutOperation {
    async fn run(&self, node: &NodeContext, _request: &RequestData) -> Result<PortValues, OperationError> {
        let value = node
            .input(IN_PORT)
            .cloned()
            .ok_or_else(|| OperationError::invalid_input("nothing on in1"))?;
        Ok(PortValues::from([(OUT_PORT.to_string(), value)]))
    }

    fn name(&self) -> &'static str {
        "stream_out"
    }
}
