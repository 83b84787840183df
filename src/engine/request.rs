// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One propagating trigger.
///
/// `id` correlates every activation of a wave; `extra` is passed through
/// untouched. Only the root request carries `data`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestData {
    pub data: String,
    pub id: String,
    pub extra: String,
}

impl RequestData {
    /// Root request with a fresh run id
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            id: Uuid::new_v4().to_string(),
            extra: String::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = extra.into();
        self
    }

    pub fn has_payload(&self) -> bool {
        !self.data.is_empty()
    }

    /// Request handed to fan-out activations: same run, no payload
    pub fn derived(&self) -> Self {
        Self {
            data: String::new(),
            id: self.id.clone(),
            extra: self.extra.clone(),
        }
    }
}
