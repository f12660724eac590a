// src/sources/json.rs - JSON context files
//
// Accepted shapes, tried in this order:
//   {"contexts": ["text1", "text2", ...]}
//   {"documents": [{"content": "text1"}, {"content": "text2"}, ...]}

use std::path::Path;

use serde_json::Value;

use super::ContextSource;
use crate::infra::errors::QaError;

pub struct JsonSource;

impl ContextSource for JsonSource {
    fn name(&self) -> &'static str {
        "JSON"
    }

    fn parse(&self, path: &Path) -> Result<Vec<String>, QaError> {
        let raw = std::fs::read_to_string(path).map_err(|e| QaError::from_io("file", path, e))?;
        parse_str(&raw)
    }
}

pub fn parse_str(raw: &str) -> Result<Vec<String>, QaError> {
    let data: Value = serde_json::from_str(raw)
        .map_err(|e| QaError::Format(format!("invalid JSON syntax: {}", e)))?;

    let Value::Object(root) = data else {
        return Err(QaError::Format("JSON root must be an object".into()));
    };

    if let Some(contexts) = root.get("contexts") {
        let Value::Array(items) = contexts else {
            return Err(QaError::Format("'contexts' must be an array".into()));
        };
        return items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                _ => Err(QaError::Format(
                    "all items in 'contexts' must be strings".into(),
                )),
            })
            .collect();
    }

    if let Some(documents) = root.get("documents") {
        let Value::Array(docs) = documents else {
            return Err(QaError::Format("'documents' must be an array".into()));
        };
        return docs
            .iter()
            .enumerate()
            .map(|(i, doc)| {
                let Value::Object(fields) = doc else {
                    return Err(QaError::Format(format!(
                        "document at index {i} must be an object"
                    )));
                };
                match fields.get("content") {
                    Some(Value::String(s)) => Ok(s.clone()),
                    Some(_) => Err(QaError::Format(format!(
                        "'content' field at index {i} must be a string"
                    ))),
                    None => Err(QaError::Format(format!(
                        "document at index {i} missing 'content' field"
                    ))),
                }
            })
            .collect();
    }

    Err(QaError::Format(
        "expected {\"contexts\": [\"text\", ...]} or {\"documents\": [{\"content\": \"text\"}, ...]}"
            .into(),
    ))
}
