// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Every diagnostic and operational log line in pipeflow comes from a
//! message type under [`messages`]. Message types follow a struct-based
//! pattern with a `Display` implementation so that:
//!
//! * log text lives in one place instead of being scattered through the engine
//! * the same event can be emitted as a log line or opened as a span
//! * structured fields (node id, run id, ports) are always attached
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::engine` - graph assembly, activation and wave events
//! * `messages::validation` - configuration validation errors
//!
//! # Usage
//!
//! ```rust
//! use pipeflow::observability::messages::engine::ActivationFailed;
//! use pipeflow::observability::messages::StructuredLog;
//! use pipeflow::errors::OperationError;
//!
//! let error = OperationError::external("connection reset");
//! ActivationFailed {
//!     node_id: "reader",
//!     run_id: "run-1",
//!     error: &error,
//! }
//! .log();
//! ```

pub mod messages;
