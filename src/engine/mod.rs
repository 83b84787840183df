// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Graph model and the trigger engine.
//!
//! * `value` / `request` - the data moving through a wave
//! * `node` / `graph` - vertices, their state and the wired graph
//! * `trigger` - one activation and its fan-out
//! * `wave` - run coordination: completion tracking and cancellation

pub mod graph;
pub mod node;
pub mod request;
pub mod trigger;
pub mod value;
pub mod wave;

pub use graph::Graph;
pub use node::{
    EdgeTarget, Node, NodeConfig, NodeContext, NodeKind, NodeState, NodeStatus, ReadinessPolicy,
};
pub use request::RequestData;
pub use trigger::{run, update_input, Activation, ActivationContext};
pub use value::{PortValue, PortValues};
pub use wave::Wave;
