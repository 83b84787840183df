// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::engine::{NodeContext, PortValues, RequestData};
use crate::errors::OperationError;

/// The main behavior of a node kind.
///
/// Returns the value produced on each output port. Ports missing from the
/// map are simply not propagated.
#[async_trait]
pub trait MainOperation: Send + Sync {
    async fn run(
        &self,
        node: &NodeContext,
        request: &RequestData,
    ) -> Result<PortValues, OperationError>;

    fn name(&self) -> &'static str;
}

/// Absorbs an incoming request without running the main operation.
///
/// The returned ports are merged into the node's own input data; nothing is
/// written downstream.
#[async_trait]
pub trait LoadInputOperation: Send + Sync {
    async fn load_input(
        &self,
        node: &NodeContext,
        request: &RequestData,
    ) -> Result<PortValues, OperationError>;
}

/// One-time setup run when the graph is initialized.
#[async_trait]
pub trait InitOperation: Send + Sync {
    async fn init_node(&self, node: &NodeContext) -> Result<(), OperationError>;
}
