use std::fmt;
use std::sync::Arc;
use log::{debug, info, warn};

use super::agents::{classify_brand_category, generate_clarification, resolve_sub_category, validate_labels};
use super::capability::ClassifierCapability;
use super::error::Result;
use super::labels::{Confidence, Label};
use super::result::ClassificationResult;
use crate::config::PipelineConfig;

/// Sequential brand → category → sub-category → validation → clarification pipeline.
///
/// The pipeline holds no mutable state: every call builds its result from scratch,
/// so a single instance can be shared across tasks with `Arc`.
///
/// ```no_run
/// # use std::sync::Arc;
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// use brand_classifier::{ClassificationPipeline, OllamaBackend};
///
/// let pipeline = ClassificationPipeline::builder()
///     .with_capability(Arc::new(OllamaBackend::new("phi3")))
///     .with_threshold(0.6)
///     .build()?;
///
/// let result = pipeline.classify_single_query("Compare Samsung and LG smart TVs").await?;
/// println!("{} / {} / {}", result.brand, result.category, result.sub_category);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ClassificationPipeline {
    pub(crate) capability: Arc<dyn ClassifierCapability>,
    pub(crate) config: PipelineConfig,
}

impl fmt::Debug for ClassificationPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassificationPipeline")
            .field("capability", &self.capability.name())
            .field("config", &self.config)
            .finish()
    }
}

impl ClassificationPipeline {
    /// Creates a new PipelineBuilder for fluent construction
    pub fn builder() -> super::builder::PipelineBuilder {
        super::builder::PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Classifies one query.
    ///
    /// Unusable model output is absorbed into defaults ("Unknown", "Other", 0.5).
    /// A failed model call is returned as an error without retry.
    pub async fn classify_single_query(&self, query: &str) -> Result<ClassificationResult> {
        let capability = self.capability.as_ref();
        let threshold = self.config.low_confidence_threshold;

        let brand_category = classify_brand_category(capability, query).await?;
        let brand = brand_category.brand;
        let category = brand_category.category;
        let category_confidence = brand_category.confidence;
        debug!("brand={} category={} confidence={}", brand, category, category_confidence);

        let (sub_category, sub_category_confidence) = if category.is_unknown() {
            debug!("Category unknown, skipping sub-category resolution");
            (Label::Unknown, Confidence::ZERO)
        } else {
            let sub = resolve_sub_category(capability, query, &category).await?;
            (sub.label, sub.confidence)
        };

        let validation = validate_labels(capability, query, &brand, &category, &sub_category).await?;

        let reasons = clarification_reasons(
            threshold,
            category_confidence,
            &sub_category,
            sub_category_confidence,
            validation.is_consistent,
        );

        let needs_clarification = !reasons.is_empty() && self.config.clarification_enabled;
        let clarification_question = if needs_clarification {
            let issue = reasons.join("; ");
            warn!("Clarification needed for {:?}: {}", query, issue);
            generate_clarification(capability, query, &issue).await?
        } else {
            None
        };

        info!(
            "Classified {:?}: brand={} category={} ({}) sub_category={} ({}) consistent={}",
            query, brand, category, category_confidence, sub_category, sub_category_confidence,
            validation.is_consistent
        );

        Ok(ClassificationResult {
            query: query.to_string(),
            brand,
            category,
            category_confidence,
            sub_category,
            sub_category_confidence,
            is_consistent: validation.is_consistent,
            validation_reason: validation.reason,
            needs_clarification,
            clarification_question,
        })
    }

    /// Classifies queries one after another, in input order.
    ///
    /// The first failing query aborts the whole batch.
    pub async fn classify_queries<S: AsRef<str>>(&self, queries: &[S]) -> Result<Vec<ClassificationResult>> {
        let mut results = Vec::with_capacity(queries.len());
        for (i, query) in queries.iter().enumerate() {
            debug!("Query {}/{}", i + 1, queries.len());
            results.push(self.classify_single_query(query.as_ref()).await?);
        }
        Ok(results)
    }
}

/// Human readable reasons why a result should be clarified, empty when it is fine.
///
/// A low confidence on the "Other" sub-category is not a reason: the label already
/// says nothing fits.
pub fn clarification_reasons(
    threshold: f64,
    category_confidence: Confidence,
    sub_category: &Label,
    sub_category_confidence: Confidence,
    is_consistent: bool,
) -> Vec<String> {
    let mut reasons = Vec::new();
    if category_confidence.is_below(threshold) {
        reasons.push(format!("low category confidence ({})", category_confidence));
    }
    if !sub_category.is_other() && sub_category_confidence.is_below(threshold) {
        reasons.push(format!("low sub-category confidence ({})", sub_category_confidence));
    }
    if !is_consistent {
        reasons.push("validator marked labels as inconsistent".to_string());
    }
    reasons
}
