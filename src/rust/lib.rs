//! Agentic brand, category and sub-category classification of free-text queries.
//!
//! Every step is a call to a text-generation model behind the
//! [`ClassifierCapability`] trait. The pipeline chains them:
//! brand/category → sub-category → validation → confidence check → clarification.
//!
//! # Basic Usage
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use brand_classifier::{ClassificationPipeline, OllamaBackend};
//!
//! let pipeline = ClassificationPipeline::builder()
//!     .with_capability(Arc::new(OllamaBackend::new("phi3")))
//!     .build()?;
//!
//! let results = pipeline.classify_queries(&["Best Dyson vacuum for pet hair"]).await?;
//! for result in &results {
//!     println!("{} / {} / {}", result.brand, result.category, result.sub_category);
//!     if let Some(question) = &result.clarification_question {
//!         println!("Ask: {}", question);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Testing against a stub
//!
//! Any type implementing [`ClassifierCapability`] can stand in for the model:
//!
//! ```
//! use async_trait::async_trait;
//! use brand_classifier::{ClassifierCapability, Invocation, Prediction, Result};
//!
//! struct AlwaysUnknown;
//!
//! #[async_trait]
//! impl ClassifierCapability for AlwaysUnknown {
//!     fn name(&self) -> &str { "always-unknown" }
//!
//!     async fn invoke(&self, _invocation: &Invocation) -> Result<Prediction> {
//!         Ok(Prediction::new().with_field("category", "Unknown"))
//!     }
//! }
//! ```

pub mod classifier;
pub mod backends;
pub mod batch;
pub mod config;
pub mod service;

pub use classifier::{
    clarification_reasons, ClassificationPipeline, ClassificationResult, ClassifierCapability,
    ClassifierError, Confidence, FieldSpec, Invocation, Label, PipelineBuilder, Prediction, Result,
    Signature, COLUMNS,
};
pub use backends::{BedrockClient, OllamaBackend, TextGenerator};
pub use config::{PipelineConfig, Settings};
pub use service::{RecordClassification, RecordService};

pub fn init_logger() {
    env_logger::init();
}
