// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Operation and notification backends.
//!
//! # Available Backends
//!
//! ## Local Backend
//! In-process operations bound by `OperationRegistry::with_builtins()`:
//! - **StreamIn**: emits the request payload, buffers input-only updates
//! - **StreamOut**: forwards its input
//! - **JsonExtractor**: pulls one value out of a JSON document
//!
//! Database, script, Hive and sync kinds talk to external systems and are
//! registered by the host application.
//!
//! ## Notify Backend
//! Notification sinks the engine publishes status and error events to:
//! - **BroadcastSink**: `tokio::sync::broadcast` fan-out to subscribers
//! - **NullSink**: discards everything
//!
//! ## Stub Backend (Test-Only)
//! Recording, failing and panicking operations plus a recording sink.
//! **Note**: NOT available in production builds
//!
//! # Examples
//!
//! ```rust
//! use pipeflow::config::OperationRegistry;
//! use pipeflow::engine::NodeKind;
//!
//! let registry = OperationRegistry::with_builtins();
//! assert!(registry.contains(NodeKind::JsonExtractor));
//! assert!(!registry.contains(NodeKind::PostgresReader));
//! ```

pub mod local;
pub mod notify;
#[cfg(test)]
pub mod stub;
