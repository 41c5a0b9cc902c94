use std::collections::HashMap;
use async_trait::async_trait;

use super::error::Result;

/// One named field of a model call, with the hint shown to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub description: &'static str,
}

impl FieldSpec {
    pub const fn new(name: &'static str, description: &'static str) -> Self {
        Self { name, description }
    }

    /// Human readable header used in prompts, e.g. `sub_category` -> `Sub Category`.
    pub fn title(&self) -> String {
        self.name
            .split('_')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let mut chars = part.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Static description of one kind of model call: what the model is asked to do,
/// which fields it receives and which fields it must answer with.
#[derive(Debug)]
pub struct Signature {
    pub name: &'static str,
    pub instructions: &'static str,
    pub inputs: &'static [FieldSpec],
    pub outputs: &'static [FieldSpec],
}

impl Signature {
    pub fn output(&self, name: &str) -> Option<&FieldSpec> {
        self.outputs.iter().find(|f| f.name == name)
    }
}

/// A signature with its input values bound, ready to be sent to a capability.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub signature: &'static Signature,
    pub inputs: Vec<(&'static str, String)>,
}

impl Invocation {
    pub fn new(signature: &'static Signature) -> Self {
        Self {
            signature,
            inputs: Vec::with_capacity(signature.inputs.len()),
        }
    }

    pub fn with_input(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.inputs.push((name, value.into()));
        self
    }

    pub fn input(&self, name: &str) -> Option<&str> {
        self.inputs.iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Free-text outputs of one model call, keyed by output field name.
///
/// There is no schema guarantee: any field may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Prediction {
    fields: HashMap<String, String>,
}

impl Prediction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Prediction {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// An opaque text-generation oracle that answers a signature with named outputs.
///
/// Implementations return `Err` only when the call itself fails (transport, backend
/// error). Noisy or partial answers are returned as-is; interpreting them is up to
/// the caller.
#[async_trait]
pub trait ClassifierCapability: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    async fn invoke(&self, invocation: &Invocation) -> Result<Prediction>;
}

/// Renders an invocation as a plain-text prompt.
///
/// The prompt describes the format as one `Field: value` line per field, fills in
/// the inputs and ends with the header of the first output field so that a
/// completion model continues from there.
pub fn render_prompt(invocation: &Invocation) -> String {
    let signature = invocation.signature;
    let mut prompt = String::new();

    prompt.push_str(signature.instructions.trim());
    prompt.push_str("\n\n---\n\nFollow the following format.\n\n");
    for field in signature.inputs.iter().chain(signature.outputs) {
        prompt.push_str(&format!("{}: {}\n", field.title(), field.description));
    }
    prompt.push_str("\n---\n\n");

    for field in signature.inputs {
        let value = invocation.input(field.name).unwrap_or_default();
        prompt.push_str(&format!("{}: {}\n", field.title(), value));
    }
    if let Some(first) = signature.outputs.first() {
        prompt.push_str(&format!("{}:", first.title()));
    }
    prompt
}

/// Extracts the output fields of `signature` from a free-text completion.
///
/// Headers are matched case-insensitively, with `_`, `-` and spaces treated alike,
/// and may be wrapped in markdown bold or `[[ ## field ## ]]` markers. Lines that
/// follow a header without starting a new one are appended to it, including lines
/// such as `However: ...` that only look like headers. An echoed input header
/// (`Query: ...`) ends the current field and its content is dropped. Text before
/// the first header belongs to the first output field, since the prompt ends with
/// that header. Never fails; fields the model skipped are simply absent.
pub fn parse_completion(signature: &Signature, text: &str) -> Prediction {
    let mut fields: HashMap<&'static str, String> = HashMap::new();
    let mut lead = String::new();
    let mut in_lead = true;
    let mut current: Option<&'static str> = None;

    for line in text.lines() {
        match classify_line(signature, line) {
            Line::Field(name, rest) => {
                in_lead = false;
                if fields.contains_key(name) {
                    // repeated header: the model started over, keep the first answer
                    current = None;
                    continue;
                }
                fields.insert(name, rest.trim().to_string());
                current = Some(name);
            }
            Line::EchoedInput => {
                in_lead = false;
                current = None;
            }
            Line::Text(text) => {
                let target = match current {
                    Some(name) => fields.entry(name).or_default(),
                    None if in_lead => &mut lead,
                    None => continue,
                };
                if !text.is_empty() {
                    if !target.is_empty() {
                        target.push('\n');
                    }
                    target.push_str(text);
                }
            }
        }
    }

    if let Some(first) = signature.outputs.first() {
        if !fields.contains_key(first.name) && !lead.is_empty() {
            fields.insert(first.name, lead);
        }
    }

    fields.into_iter().collect()
}

enum Line<'a> {
    /// Header of one of the signature's output fields, with the rest of the line
    Field(&'static str, &'a str),
    /// Header of one of the signature's inputs, echoed back by the model
    EchoedInput,
    /// Anything else, trimmed
    Text(&'a str),
}

const MAX_HEADER_WORDS: usize = 4;

fn normalize_key(raw: &str) -> String {
    raw.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

fn classify_line<'a>(signature: &Signature, line: &'a str) -> Line<'a> {
    let stripped = line.trim_start()
        .trim_start_matches(|c: char| c == '*' || c == '-' || c == '#')
        .trim_start();

    let split = if let Some(inner) = stripped.strip_prefix("[[") {
        inner.split_once("]]")
            .map(|(head, rest)| (head.trim().trim_matches('#'), rest))
    } else {
        stripped.split_once(':')
            .map(|(head, rest)| (head.trim_end_matches('*'), rest.trim_start_matches('*')))
    };
    let Some((head, rest)) = split else {
        return Line::Text(line.trim());
    };

    let key = normalize_key(head);
    let header_like = !key.is_empty()
        && key.split(' ').count() <= MAX_HEADER_WORDS
        && head.chars().all(|c| c.is_alphabetic() || c == '_' || c == '-' || c == ' ' || c == '#');
    if !header_like {
        return Line::Text(line.trim());
    }

    if let Some(field) = signature.outputs.iter().find(|field| normalize_key(field.name) == key) {
        return Line::Field(field.name, rest);
    }
    if signature.inputs.iter().any(|field| normalize_key(field.name) == key) {
        return Line::EchoedInput;
    }
    Line::Text(line.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::agents::VALIDATION;

    static TEST_SIGNATURE: Signature = Signature {
        name: "test",
        instructions: "Classify the query.",
        inputs: &[FieldSpec::new("query", "The user query")],
        outputs: &[
            FieldSpec::new("sub_category", "Short label"),
            FieldSpec::new("confidence", "Between 0 and 1"),
        ],
    };

    #[test]
    fn test_field_title() {
        assert_eq!(FieldSpec::new("sub_category", "").title(), "Sub Category");
        assert_eq!(FieldSpec::new("query", "").title(), "Query");
    }

    #[test]
    fn test_render_prompt() {
        let invocation = Invocation::new(&TEST_SIGNATURE).with_input("query", "Samsung TV");
        let prompt = render_prompt(&invocation);
        assert!(prompt.starts_with("Classify the query."));
        assert!(prompt.contains("Sub Category: Short label\n"));
        assert!(prompt.contains("Query: Samsung TV\n"));
        assert!(prompt.ends_with("Sub Category:"));
    }

    #[test]
    fn test_parse_plain_headers() {
        let prediction = parse_completion(&TEST_SIGNATURE, "Sub Category: Smart TVs\nConfidence: 0.75");
        assert_eq!(prediction.get("sub_category"), Some("Smart TVs"));
        assert_eq!(prediction.get("confidence"), Some("0.75"));
    }

    #[test]
    fn test_parse_continuation_of_prompt() {
        let prediction = parse_completion(&TEST_SIGNATURE, " Soundbars\nConfidence: 0.4\n");
        assert_eq!(prediction.get("sub_category"), Some("Soundbars"));
        assert_eq!(prediction.get("confidence"), Some("0.4"));
    }

    #[test]
    fn test_parse_decorated_headers() {
        let text = "**Sub_Category:** Laptops\n[[ ## confidence ## ]] 0.9";
        let prediction = parse_completion(&TEST_SIGNATURE, text);
        assert_eq!(prediction.get("sub_category"), Some("Laptops"));
        assert_eq!(prediction.get("confidence"), Some("0.9"));
    }

    #[test]
    fn test_parse_preamble_replaced_by_header() {
        let text = "Sure, here you go.\nSub Category: Tablets";
        let prediction = parse_completion(&TEST_SIGNATURE, text);
        assert_eq!(prediction.get("sub_category"), Some("Tablets"));
        assert_eq!(prediction.get("confidence"), None);
    }

    #[test]
    fn test_parse_repeated_header_keeps_first() {
        let text = "Confidence: 0.8\nConfidence: 0.1";
        let prediction = parse_completion(&TEST_SIGNATURE, text);
        assert_eq!(prediction.get("confidence"), Some("0.8"));
    }

    #[test]
    fn test_parse_echoed_input_ends_a_field() {
        let text = "Sub Category: Plans\nQuery: Netflix premium plan price\nConfidence: 0.9";
        let prediction = parse_completion(&TEST_SIGNATURE, text);
        assert_eq!(prediction.get("sub_category"), Some("Plans"));
        assert_eq!(prediction.get("confidence"), Some("0.9"));
        assert_eq!(prediction.len(), 2);
    }

    #[test]
    fn test_parse_unknown_header_is_continuation() {
        let text = "Is Consistent: no\nReason: Brand mismatch.\nHowever: category is fine.";
        let prediction = parse_completion(&VALIDATION, text);
        assert_eq!(prediction.get("is_consistent"), Some("no"));
        assert_eq!(prediction.get("reason"), Some("Brand mismatch.\nHowever: category is fine."));
    }

    #[test]
    fn test_parse_unknown_header_before_first_field() {
        let text = "Note: the user wants prices\nSub Category: Plans";
        let prediction = parse_completion(&TEST_SIGNATURE, text);
        assert_eq!(prediction.get("sub_category"), Some("Plans"));
        assert_eq!(prediction.len(), 1);
    }

    #[test]
    fn test_parse_multiline_value() {
        let text = "Sub Category: Smart\nTVs\n\nConfidence: 0.7";
        let prediction = parse_completion(&TEST_SIGNATURE, text);
        assert_eq!(prediction.get("sub_category"), Some("Smart\nTVs"));
    }

    #[test]
    fn test_parse_empty_completion() {
        assert!(parse_completion(&TEST_SIGNATURE, "").is_empty());
    }
}
