// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::{json, Value};

use crate::config::consts::{ERROR_CHANNEL, STATUS_CHANNEL};
use crate::engine::NodeStatus;

/// Event published by the trigger engine for external observers
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationEvent {
    Status { node_id: String, status: NodeStatus },
    Error { node_id: String, message: String },
}

impl NotificationEvent {
    pub fn status(node_id: impl Into<String>, status: NodeStatus) -> Self {
        NotificationEvent::Status {
            node_id: node_id.into(),
            status,
        }
    }

    pub fn error(node_id: impl Into<String>, message: impl Into<String>) -> Self {
        NotificationEvent::Error {
            node_id: node_id.into(),
            message: message.into(),
        }
    }

    pub fn node_id(&self) -> &str {
        match self {
            NotificationEvent::Status { node_id, .. } | NotificationEvent::Error { node_id, .. } => {
                node_id
            }
        }
    }

    /// Event name observers subscribe to
    pub fn channel(&self) -> &'static str {
        match self {
            NotificationEvent::Status { .. } => STATUS_CHANNEL,
            NotificationEvent::Error { .. } => ERROR_CHANNEL,
        }
    }

    /// `{node id: status code}` or `{node id: message}`
    pub fn payload(&self) -> Value {
        match self {
            NotificationEvent::Status { node_id, status } => json!({ node_id.as_str(): status.code() }),
            NotificationEvent::Error { node_id, message } => json!({ node_id.as_str(): message }),
        }
    }
}

/// Fire-and-forget publisher for status and error events.
///
/// Implementations must not block; the engine never waits for delivery.
pub trait NotificationSink: Send + Sync {
    fn publish(&self, event: NotificationEvent);
}
