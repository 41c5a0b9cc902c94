//! Single-record classification against a hosted model.
//!
//! Independent of the agentic pipeline: one record in, the extracted text plus the
//! model's raw answer out. [`RecordService::handle_request`] is the outer boundary
//! and turns every failure into an `{"error": ...}` payload.

use std::sync::Arc;
use log::{error, info};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::backends::TextGenerator;
use crate::config::DEFAULT_TEXT_COLUMN;
use crate::{ClassifierError, Result};

/// Result of classifying one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordClassification {
    pub input_text: String,
    /// Raw model output, not parsed
    pub classification: String,
}

/// Returns the text held in `column`.
///
/// Fails with `MissingField` naming the column when it is absent. Non-string values
/// are classified as their JSON text.
pub fn extract_text(record: &Map<String, Value>, column: &str) -> Result<String> {
    match record.get(column) {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(other) => Ok(other.to_string()),
        None => Err(ClassifierError::missing_column(column)),
    }
}

pub fn brand_prompt(text: &str) -> String {
    format!(
        "Classify the brand and category from this product description:\n\n\
         {}\n\n\
         Respond in JSON with:\n\
         - brand\n\
         - category\n\
         - confidence",
        text
    )
}

pub struct RecordService {
    generator: Arc<dyn TextGenerator>,
    text_column: String,
}

impl RecordService {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            text_column: DEFAULT_TEXT_COLUMN.to_string(),
        }
    }

    pub fn with_text_column(mut self, column: impl Into<String>) -> Self {
        self.text_column = column.into();
        self
    }

    pub fn text_column(&self) -> &str {
        &self.text_column
    }

    pub async fn classify_record(&self, record: &Map<String, Value>) -> Result<RecordClassification> {
        let input_text = extract_text(record, &self.text_column)?;
        let classification = self.generator.generate(&brand_prompt(&input_text)).await?;
        info!("{} classified record ({} chars)", self.generator.name(), input_text.len());
        Ok(RecordClassification {
            input_text,
            classification,
        })
    }

    /// Handles a `{"record": {...}}` request body. Never fails.
    pub async fn handle_request(&self, payload: &Value) -> Value {
        let record = match payload.get("record").and_then(Value::as_object) {
            Some(record) if !record.is_empty() => record,
            _ => return json!({"error": "Missing 'record' field in request body"}),
        };

        match self.classify_record(record).await {
            Ok(classification) => json!(classification),
            Err(e) => {
                error!("Record classification failed: {}", e);
                json!({"error": e.to_string()})
            }
        }
    }
}

/// Liveness payload of the service.
pub fn health() -> Value {
    json!({"status": "running"})
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_extract_text() {
        let row = record(json!({"product_id": "123", "description": "Organic almond butter 500g"}));
        assert_eq!(extract_text(&row, "description").unwrap(), "Organic almond butter 500g");
        assert_eq!(extract_text(&row, "product_id").unwrap(), "123");
    }

    #[test]
    fn test_extract_non_string() {
        let row = record(json!({"sku": 42}));
        assert_eq!(extract_text(&row, "sku").unwrap(), "42");
    }

    #[test]
    fn test_missing_column() {
        let row = record(json!({"title": "Nike shoes"}));
        let err = extract_text(&row, "description").unwrap_err();
        assert!(matches!(err, ClassifierError::MissingField(_)));
        assert!(err.to_string().contains("'description'"));
    }

    #[test]
    fn test_prompt_and_health() {
        assert!(brand_prompt("Ultra-light running shoes").contains("Ultra-light running shoes\n\nRespond in JSON"));
        assert_eq!(health()["status"], "running");
    }
}
