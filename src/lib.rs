// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // local operations + notification sinks
pub mod config;     // config loading, validation, operation registry
pub mod engine;     // graph model + trigger engine
pub mod errors;     // error handling
pub mod observability;
pub mod traits;     // operation and sink abstractions
