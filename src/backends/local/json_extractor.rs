// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;

use crate::engine::{NodeContext, PortValue, PortValues, RequestData};
use crate::errors::OperationError;
use crate::traits::MainOperation;

/// Config key holding the extraction path
pub const PATH_KEY: &str = "path";

/// Extracts one value from a JSON document.
///
/// Reads the document from `in1` (JSON text or an already structured value)
/// and emits the value at the configured `path` on `out1`. The path is a
/// dot-separated list of object keys and array indices, e.g.
/// `orders.0.total`; an empty path selects the whole document.
pub struct JsonExtractorOperation;

#[async_trait]
impl MainOperation for JsonExtractorOperation {
    async fn run(&self, node: &NodeContext, _request: &RequestData) -> Result<PortValues, OperationError> {
        let path = node.config_str(PATH_KEY)?;
        let document = match node.input("in1") {
            Some(PortValue::Text(text)) => serde_json::from_str::<Value>(text)
                .map_err(|e| OperationError::invalid_input(format!("in1 is not JSON: {}", e)))?,
            Some(PortValue::Structured(value)) => value.clone(),
            Some(other) => {
                return Err(OperationError::invalid_input(format!(
                    "in1 holds {}, expected JSON",
                    other.kind()
                )))
            }
            None => return Err(OperationError::invalid_input("nothing on in1")),
        };

        let found = extract(&document, path)
            .ok_or_else(|| OperationError::invalid_input(format!("path '{}' not found", path)))?;

        let value = match found {
            Value::String(s) => PortValue::Text(s.clone()),
            Value::Bool(b) => PortValue::Boolean(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => PortValue::Integer(i),
                None => PortValue::Number(n.as_f64().unwrap_or_default()),
            },
            other => PortValue::from(other.clone()),
        };
        Ok(PortValues::from([("out1".to_string(), value)]))
    }

    fn name(&self) -> &'static str {
        "json_extractor"
    }
}

fn extract<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(document);
    }
    path.split('.').try_fold(document, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::NodeKind;
    use serde_json::json;
    use std::sync::Arc;

    fn context(path: Option<&str>, input: PortValue) -> NodeContext {
        let mut config = crate::engine::NodeConfig::new();
        if let Some(path) = path {
            config.insert(PATH_KEY.to_string(), json!(path));
        }
        NodeContext {
            id: "extract".to_string(),
            kind: NodeKind::JsonExtractor,
            config: Arc::new(config),
            input_data: PortValues::from([("in1".to_string(), input)]),
            triggered_ports: vec!["in1".to_string()],
        }
    }

    #[test]
    fn test_extract_paths_table_driven() {
        struct TestCase {
            path: &'static str,
            expected: Option<Value>,
        }

        let document = json!({
            "user": { "name": "ada", "tags": ["x", "y"] },
            "count": 3
        });

        let test_cases = vec![
            TestCase { path: "user.name", expected: Some(json!("ada")) },
            TestCase { path: "user.tags.1", expected: Some(json!("y")) },
            TestCase { path: "count", expected: Some(json!(3)) },
            TestCase { path: "", expected: Some(document.clone()) },
            TestCase { path: "user.missing", expected: None },
            TestCase { path: "user.tags.9", expected: None },
            TestCase { path: "count.deeper", expected: None },
        ];

        for case in test_cases {
            assert_eq!(extract(&document, case.path).cloned(), case.expected, "path {}", case.path);
        }
    }

    #[tokio::test]
    async fn test_run_from_text_and_structured_input() {
        let from_text = context(Some("user.name"), PortValue::from(r#"{"user":{"name":"ada"}}"#));
        let outputs = JsonExtractorOperation
            .run(&from_text, &RequestData::default())
            .await
            .unwrap();
        assert_eq!(outputs["out1"], PortValue::from("ada"));

        let structured = context(Some("n"), PortValue::from(json!({"n": 42})));
        let outputs = JsonExtractorOperation
            .run(&structured, &RequestData::default())
            .await
            .unwrap();
        assert_eq!(outputs["out1"], PortValue::Integer(42));
    }

    #[tokio::test]
    async fn test_run_errors() {
        let missing_path = context(Some("nope"), PortValue::from("{}"));
        assert!(matches!(
            JsonExtractorOperation.run(&missing_path, &RequestData::default()).await,
            Err(OperationError::InvalidInput(_))
        ));

        let not_json = context(Some("a"), PortValue::from("not json"));
        assert!(matches!(
            JsonExtractorOperation.run(&not_json, &RequestData::default()).await,
            Err(OperationError::InvalidInput(_))
        ));

        let no_config = context(None, PortValue::from("{}"));
        assert!(matches!(
            JsonExtractorOperation.run(&no_config, &RequestData::default()).await,
            Err(OperationError::InvalidConfig { .. })
        ));
    }
}
