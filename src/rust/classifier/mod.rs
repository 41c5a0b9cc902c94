mod error;
mod labels;
pub mod capability;
pub mod agents;
pub mod builder;
mod pipeline;
mod result;

pub use error::{ClassifierError, Result};
pub use labels::{Confidence, Label, DEFAULT_CONFIDENCE};
pub use capability::{ClassifierCapability, FieldSpec, Invocation, Prediction, Signature};
pub use builder::PipelineBuilder;
pub use pipeline::{ClassificationPipeline, clarification_reasons};
pub use result::{ClassificationResult, COLUMNS};
