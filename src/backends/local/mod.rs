// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-process operations for the node kinds that need no external system.

pub mod json_extractor;
pub mod stream;

pub use json_extractor::JsonExtractorOperation;
pub use stream::{StreamInOperation, StreamOutOperation};
