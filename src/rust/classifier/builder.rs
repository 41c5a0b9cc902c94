use std::sync::Arc;
use log::info;

use super::capability::ClassifierCapability;
use super::error::ClassifierError;
use super::pipeline::ClassificationPipeline;
use crate::config::PipelineConfig;

/// A builder for constructing a ClassificationPipeline with a fluent interface.
#[derive(Default)]
pub struct PipelineBuilder {
    capability: Option<Arc<dyn ClassifierCapability>>,
    config: PipelineConfig,
}

impl PipelineBuilder {
    /// Creates a new empty PipelineBuilder instance with default configuration
    ///
    /// # Example
    /// ```
    /// use brand_classifier::PipelineBuilder;
    ///
    /// let builder = PipelineBuilder::new();
    /// ```
    pub fn new() -> Self {
        Self {
            capability: None,
            config: PipelineConfig::default(),
        }
    }

    /// Sets the model backend every step of the pipeline talks to
    ///
    /// # Arguments
    /// * `capability` - Any implementation of `ClassifierCapability`, e.g. `OllamaBackend`
    ///   or a scripted stub in tests
    pub fn with_capability(mut self, capability: Arc<dyn ClassifierCapability>) -> Self {
        self.capability = Some(capability);
        self
    }

    /// Replaces the whole pipeline configuration
    ///
    /// # Example
    /// ```
    /// use brand_classifier::{PipelineBuilder, PipelineConfig};
    ///
    /// let builder = PipelineBuilder::new()
    ///     .with_config(PipelineConfig::default().clarification_enabled(false));
    /// ```
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the confidence below which a result needs clarification (default 0.6)
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.config.low_confidence_threshold = threshold;
        self
    }

    /// Turns clarifying questions on or off (default on)
    pub fn with_clarification(mut self, enabled: bool) -> Self {
        self.config.clarification_enabled = enabled;
        self
    }

    /// Builds and returns the final ClassificationPipeline instance
    ///
    /// # Returns
    /// * `Result<ClassificationPipeline, ClassifierError>` - The pipeline if successful, or a
    ///   `ValidationError` if:
    ///   - No capability has been set
    ///   - The threshold is not a number within `[0, 1]`
    pub fn build(self) -> Result<ClassificationPipeline, ClassifierError> {
        let capability = self.capability
            .ok_or_else(|| ClassifierError::ValidationError("A classifier capability must be set".into()))?;

        let threshold = self.config.low_confidence_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ClassifierError::ValidationError(
                format!("Confidence threshold must be between 0 and 1, got {}", threshold)
            ));
        }

        info!(
            "Pipeline ready: backend={} threshold={} clarification={}",
            capability.name(), threshold, self.config.clarification_enabled
        );

        Ok(ClassificationPipeline {
            capability,
            config: self.config,
        })
    }
}
