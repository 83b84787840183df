// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable text and
//! [`StructuredLog`] for emitting it with its fields attached at the right
//! level.
//!
//! # Organization
//!
//! * `engine` - graph assembly, node activation, fan-out and wave lifecycle
//! * `validation` - configuration validation errors
//!
//! # Usage Pattern
//!
//! ```rust
//! use pipeflow::observability::messages::engine::GraphBuilt;
//! use pipeflow::observability::messages::StructuredLog;
//!
//! let msg = GraphBuilt {
//!     node_count: 4,
//!     edge_count: 4,
//! };
//!
//! msg.log();
//! ```

use tracing::Span;

pub mod engine;
pub mod validation;

/// A message that knows its own log level and structured fields.
pub trait StructuredLog {
    /// Emit the message as a single event
    fn log(&self);

    /// Open a span carrying the message's fields
    fn span(&self, name: &str) -> Span;
}
