// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Port name -> value, used for operation outputs and absorbed inputs
pub type PortValues = HashMap<String, PortValue>;

/// A value carried on a port.
///
/// `Null` is a placeholder: an input port holding `Null` does not count as
/// having received data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortValue {
    Null,
    Text(String),
    Number(f64),
    Integer(i64),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
    Binary(Vec<u8>),
    Structured(serde_json::Value),
}

impl PortValue {
    pub fn is_null(&self) -> bool {
        matches!(self, PortValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PortValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_structured(&self) -> Option<&serde_json::Value> {
        match self {
            PortValue::Structured(v) => Some(v),
            _ => None,
        }
    }

    /// Short name of the variant, for logs
    pub fn kind(&self) -> &'static str {
        match self {
            PortValue::Null => "null",
            PortValue::Text(_) => "text",
            PortValue::Number(_) => "number",
            PortValue::Integer(_) => "integer",
            PortValue::Boolean(_) => "boolean",
            PortValue::Timestamp(_) => "timestamp",
            PortValue::Binary(_) => "binary",
            PortValue::Structured(_) => "structured",
        }
    }
}

impl From<&str> for PortValue {
    fn from(value: &str) -> Self {
        PortValue::Text(value.to_string())
    }
}

impl From<String> for PortValue {
    fn from(value: String) -> Self {
        PortValue::Text(value)
    }
}

impl From<f64> for PortValue {
    fn from(value: f64) -> Self {
        PortValue::Number(value)
    }
}

impl From<i64> for PortValue {
    fn from(value: i64) -> Self {
        PortValue::Integer(value)
    }
}

impl From<bool> for PortValue {
    fn from(value: bool) -> Self {
        PortValue::Boolean(value)
    }
}

impl From<DateTime<Utc>> for PortValue {
    fn from(value: DateTime<Utc>) -> Self {
        PortValue::Timestamp(value)
    }
}

impl From<Vec<u8>> for PortValue {
    fn from(value: Vec<u8>) -> Self {
        PortValue::Binary(value)
    }
}

impl From<serde_json::Value> for PortValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => PortValue::Null,
            other => PortValue::Structured(other),
        }
    }
}
