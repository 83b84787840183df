// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use tokio::sync::broadcast;

use crate::config::consts::{DEFAULT_NAMESPACE, NOTIFICATION_BUFFER};
use crate::observability::messages::engine::NotificationUndelivered;
use crate::observability::messages::StructuredLog;
use crate::traits::{NotificationEvent, NotificationSink};

/// Broadcasts every event to all current subscribers of one namespace.
///
/// Publishing never blocks. Events published while nobody is subscribed are
/// dropped; a subscriber that falls more than the buffer size behind gets
/// `RecvError::Lagged` and skips ahead.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    namespace: String,
    sender: broadcast::Sender<NotificationEvent>,
}

impl BroadcastSink {
    pub fn new(namespace: impl Into<String>) -> Self {
        let (sender, _) = broadcast::channel(NOTIFICATION_BUFFER);
        Self {
            namespace: namespace.into(),
            sender,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl NotificationSink for BroadcastSink {
    fn publish(&self, event: NotificationEvent) {
        if let Err(broadcast::error::SendError(event)) = self.sender.send(event) {
            NotificationUndelivered {
                channel: event.channel(),
                namespace: &self.namespace,
                node_id: event.node_id(),
            }
            .log();
        }
    }
}

/// Discards every event; used when nothing observes the engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn publish(&self, _event: NotificationEvent) {}
}
