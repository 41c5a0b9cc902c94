//! Prompt templates over the shared classifier capability.
//!
//! Each adapter binds its inputs to a static [`Signature`], invokes the capability
//! once and coerces the free-text answer into typed values. None of them branch on
//! the answer; unusable output falls back to the sentinel defaults.

use log::debug;

use super::capability::{ClassifierCapability, FieldSpec, Invocation, Prediction, Signature};
use super::error::Result;
use super::labels::{Confidence, Label};

pub static BRAND_CATEGORY: Signature = Signature {
    name: "brand_category",
    instructions: "Extract primary brand and high-level category from a user query.\n\n\
        No fixed taxonomy is used. Extract a single primary brand, or \"Unknown\" if none, \
        and infer a short category label like \"Electronics\", \"Home Appliances\", \
        \"Streaming Service\", \"Retail\", \"Media & Entertainment\" or \"General Inquiry\".",
    inputs: &[FieldSpec::new("query", "User's query/prompt")],
    outputs: &[
        FieldSpec::new("brand", "Primary brand name mentioned, or 'Unknown' if none."),
        FieldSpec::new("category", "High-level category label (short phrase)."),
        FieldSpec::new("confidence", "Model's confidence between 0 and 1."),
    ],
};

pub static SUB_CATEGORY: Signature = Signature {
    name: "sub_category",
    instructions: "Classify a user query into a more granular sub-category under a given \
        high-level category.\n\nNo fixed taxonomy is used. Invent a short, business-meaningful \
        sub-category label. If unsure, use \"Other\".",
    inputs: &[
        FieldSpec::new("query", "The original user query or prompt"),
        FieldSpec::new("category", "The high-level category already inferred"),
    ],
    outputs: &[
        FieldSpec::new("sub_category", "Short, human-readable sub-category label (string)"),
        FieldSpec::new("confidence", "Model's confidence between 0 and 1"),
    ],
};

pub static VALIDATION: Signature = Signature {
    name: "validation",
    instructions: "Check whether the brand, category and sub-category labels are consistent \
        with the original query.",
    inputs: &[
        FieldSpec::new("query", "The original user query"),
        FieldSpec::new("brand", "Extracted brand"),
        FieldSpec::new("category", "Inferred category"),
        FieldSpec::new("sub_category", "Inferred sub-category"),
    ],
    outputs: &[
        FieldSpec::new("is_consistent", "Return \"yes\" if labels are consistent, \"no\" otherwise."),
        FieldSpec::new("reason", "Short explanation if labels appear inconsistent or low-quality."),
    ],
};

pub static CLARIFICATION: Signature = Signature {
    name: "clarification",
    instructions: "Classification of the query is uncertain or inconsistent. Generate a short \
        clarifying question to ask the user.",
    inputs: &[
        FieldSpec::new("query", "The original user query"),
        FieldSpec::new("issue", "Why the system is uncertain (free text)"),
    ],
    outputs: &[FieldSpec::new("question", "One short clarifying question to ask the user.")],
};

/// Brand, category and confidence for a query.
#[derive(Debug, Clone, PartialEq)]
pub struct BrandCategory {
    pub brand: Label,
    pub category: Label,
    pub confidence: Confidence,
}

/// A sub-category under an already known category.
#[derive(Debug, Clone, PartialEq)]
pub struct SubCategory {
    pub label: Label,
    pub confidence: Confidence,
}

/// Verdict of the consistency check.
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    pub is_consistent: bool,
    pub reason: Option<String>,
}

/// Instruction prompt sent as the `query` input of the brand/category call.
pub fn brand_category_prompt(query: &str) -> String {
    format!(
        "You are a brand and category classifier.\n\
         For the given query, extract:\n\
         - primary brand name (or 'Unknown' if not clear),\n\
         - a short high-level category label (e.g. 'Electronics', 'Home Appliances', \
         'Streaming Service', 'Media', 'Retail', 'General Inquiry').\n\
         Return a confidence between 0 and 1.\n\n\
         User query: {}",
        query
    )
}

/// Instruction prompt sent as the `query` input of the sub-category call.
pub fn sub_category_prompt(query: &str) -> String {
    format!(
        "You refine categories into more granular sub-categories.\n\
         Given the user query and its high-level category, propose a short, \
         business-meaningful sub-category under that category.\n\
         If you are not confident or nothing fits, respond with 'Other'. \
         Also return a confidence between 0 and 1.\n\n\
         User query: {}",
        query
    )
}

/// True only for a literal "yes" after trimming and lower-casing.
pub fn parse_consistency(raw: Option<&str>) -> bool {
    raw.map(|value| value.trim().to_lowercase() == "yes").unwrap_or(false)
}

fn optional_text(prediction: &Prediction, field: &str) -> Option<String> {
    prediction.get(field)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

pub async fn classify_brand_category(
    capability: &dyn ClassifierCapability,
    query: &str,
) -> Result<BrandCategory> {
    let invocation = Invocation::new(&BRAND_CATEGORY)
        .with_input("query", brand_category_prompt(query));
    let prediction = capability.invoke(&invocation).await?;
    debug!("{} answered brand/category: {:?}", capability.name(), prediction);

    Ok(BrandCategory {
        brand: Label::from_top_level_output(prediction.get("brand")),
        category: Label::from_top_level_output(prediction.get("category")),
        confidence: Confidence::parse(prediction.get("confidence")),
    })
}

pub async fn resolve_sub_category(
    capability: &dyn ClassifierCapability,
    query: &str,
    category: &Label,
) -> Result<SubCategory> {
    let invocation = Invocation::new(&SUB_CATEGORY)
        .with_input("query", sub_category_prompt(query))
        .with_input("category", category.as_str());
    let prediction = capability.invoke(&invocation).await?;
    debug!("{} answered sub-category: {:?}", capability.name(), prediction);

    Ok(SubCategory {
        label: Label::from_output(prediction.get("sub_category"), Label::Other),
        confidence: Confidence::parse(prediction.get("confidence")),
    })
}

pub async fn validate_labels(
    capability: &dyn ClassifierCapability,
    query: &str,
    brand: &Label,
    category: &Label,
    sub_category: &Label,
) -> Result<Validation> {
    let invocation = Invocation::new(&VALIDATION)
        .with_input("query", query)
        .with_input("brand", brand.as_str())
        .with_input("category", category.as_str())
        .with_input("sub_category", sub_category.as_str());
    let prediction = capability.invoke(&invocation).await?;
    debug!("{} answered validation: {:?}", capability.name(), prediction);

    Ok(Validation {
        is_consistent: parse_consistency(prediction.get("is_consistent")),
        reason: optional_text(&prediction, "reason"),
    })
}

pub async fn generate_clarification(
    capability: &dyn ClassifierCapability,
    query: &str,
    issue: &str,
) -> Result<Option<String>> {
    let invocation = Invocation::new(&CLARIFICATION)
        .with_input("query", query)
        .with_input("issue", issue);
    let prediction = capability.invoke(&invocation).await?;
    debug!("{} answered clarification: {:?}", capability.name(), prediction);

    Ok(optional_text(&prediction, "question"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedAnswer(Prediction);

    #[async_trait]
    impl ClassifierCapability for FixedAnswer {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn invoke(&self, _invocation: &Invocation) -> Result<Prediction> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_consistency_is_strict() {
        assert!(parse_consistency(Some("yes")));
        assert!(parse_consistency(Some(" YES \n")));
        assert!(parse_consistency(Some("Yes")));
        for raw in ["No", "NO", "", "maybe", "true", "1", "yes."] {
            assert!(!parse_consistency(Some(raw)), "{:?} must not count as consistent", raw);
        }
        assert!(!parse_consistency(None));
    }

    #[test]
    fn test_prompts_embed_query() {
        assert!(brand_category_prompt("Dyson V15").ends_with("User query: Dyson V15"));
        assert!(sub_category_prompt("Dyson V15").contains("respond with 'Other'"));
    }

    #[test]
    fn test_brand_category_defaults() {
        let capability = FixedAnswer(Prediction::new().with_field("confidence", "very sure"));
        let answer = tokio_test::block_on(classify_brand_category(&capability, "hello")).unwrap();
        assert_eq!(answer.brand, Label::Unknown);
        assert_eq!(answer.category, Label::Unknown);
        assert_eq!(answer.confidence.value(), 0.5);
    }

    #[test]
    fn test_brand_named_other_is_kept() {
        let capability = FixedAnswer(Prediction::new()
            .with_field("brand", " other ")
            .with_field("category", "Other"));
        let answer = tokio_test::block_on(classify_brand_category(&capability, "hello")).unwrap();
        assert_eq!(answer.brand, Label::Named("other".into()));
        assert!(!answer.category.is_other());
        assert_eq!(answer.category.as_str(), "Other");
    }

    #[test]
    fn test_sub_category_defaults_to_other() {
        let capability = FixedAnswer(Prediction::new().with_field("sub_category", "  "));
        let category = Label::parse("Electronics");
        let answer = tokio_test::block_on(resolve_sub_category(&capability, "q", &category)).unwrap();
        assert_eq!(answer.label, Label::Other);
        assert_eq!(answer.confidence, Confidence::DEFAULT);
    }

    #[test]
    fn test_validation_reason_is_optional() {
        let capability = FixedAnswer(Prediction::new().with_field("is_consistent", "no").with_field("reason", ""));
        let label = Label::Unknown;
        let answer = tokio_test::block_on(validate_labels(&capability, "q", &label, &label, &label)).unwrap();
        assert!(!answer.is_consistent);
        assert_eq!(answer.reason, None);
    }

    #[test]
    fn test_clarification_question_trimmed() {
        let capability = FixedAnswer(Prediction::new().with_field("question", " Which TV model? "));
        let question = tokio_test::block_on(generate_clarification(&capability, "q", "issue")).unwrap();
        assert_eq!(question.as_deref(), Some("Which TV model?"));
    }
}
