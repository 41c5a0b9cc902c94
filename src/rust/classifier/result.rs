use serde::Serialize;
use serde_json::{Map, Value};

use super::labels::{Confidence, Label};

/// Output columns, in the order they are written.
pub const COLUMNS: [&str; 10] = [
    "query",
    "brand",
    "category",
    "category_confidence",
    "sub_category",
    "sub_category_confidence",
    "is_consistent",
    "validation_reason",
    "needs_clarification",
    "clarification_question",
];

/// Classification of a single query. Built in one pass by the pipeline and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub query: String,
    pub brand: Label,
    pub category: Label,
    pub category_confidence: Confidence,
    pub sub_category: Label,
    pub sub_category_confidence: Confidence,
    pub is_consistent: bool,
    pub validation_reason: Option<String>,
    pub needs_clarification: bool,
    pub clarification_question: Option<String>,
}

impl ClassificationResult {
    /// Mapping form, keyed by [`COLUMNS`].
    pub fn to_record(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            // every field serializes to plain JSON, so the object case always applies
            _ => Map::new(),
        }
    }
}
