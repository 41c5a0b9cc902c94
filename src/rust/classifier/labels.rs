use std::fmt;
use serde::{Serialize, Serializer};

/// Confidence assumed when the model returns something that is not a number.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// A classification label as returned by the model.
///
/// `Unknown` and `Other` are control values, not display strings: the pipeline
/// branches on them, so they are matched case-insensitively when parsed and never
/// compared as raw text afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Label {
    /// A label the model produced, trimmed
    Named(String),
    /// Nothing could be determined
    Unknown,
    /// No good fit among the labels the model would propose
    Other,
}

impl Label {
    /// Parses trimmed text, recognising the sentinels in any case.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("unknown") {
            Label::Unknown
        } else if trimmed.eq_ignore_ascii_case("other") {
            Label::Other
        } else {
            Label::Named(trimmed.to_string())
        }
    }

    /// Reads a raw model output field, falling back when it is missing or blank.
    pub fn from_output(raw: Option<&str>, fallback: Label) -> Self {
        match raw.map(str::trim) {
            Some(text) if !text.is_empty() => Self::parse(text),
            _ => fallback,
        }
    }

    /// Reads a brand or category field. Only `Unknown` is recognised: these labels
    /// have no "no good fit" escape value, so a literal "other" stays a name.
    /// Missing or blank output is `Unknown`.
    pub fn from_top_level_output(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(text) if text.eq_ignore_ascii_case("unknown") => Label::Unknown,
            Some(text) if !text.is_empty() => Label::Named(text.to_string()),
            _ => Label::Unknown,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Label::Unknown)
    }

    pub fn is_other(&self) -> bool {
        matches!(self, Label::Other)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Label::Named(name) => name,
            Label::Unknown => "Unknown",
            Label::Other => "Other",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Label {
    fn from(raw: &str) -> Self {
        Label::parse(raw)
    }
}

impl Serialize for Label {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A model confidence, always within `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Confidence(f64);

impl Confidence {
    pub const ZERO: Confidence = Confidence(0.0);
    pub const DEFAULT: Confidence = Confidence(DEFAULT_CONFIDENCE);

    /// Clamps `value` into range. NaN maps to the default.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::DEFAULT;
        }
        Confidence(value.clamp(0.0, 1.0))
    }

    /// Best-effort parse of a raw model field; anything that is not a number yields 0.5.
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|text| text.trim().parse::<f64>().ok())
            .map(Self::new)
            .unwrap_or(Self::DEFAULT)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Strict comparison: a confidence equal to the threshold is not below it.
    pub fn is_below(self, threshold: f64) -> bool {
        self.0 < threshold
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
