use std::env;
use std::path::PathBuf;

/// Confidence below which a label is considered unreliable.
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.6;

pub const DEFAULT_MODEL_NAME: &str = "phi3";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_AWS_REGION: &str = "us-east-1";
pub const DEFAULT_TEXT_COLUMN: &str = "description";
pub const DEFAULT_BEDROCK_MODEL_ID: &str = "anthropic.claude-3-sonnet-20240229-v1:0";

/// Decision rules of the pipeline. Read-only once the pipeline is built.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Strict `<` threshold for category and sub-category confidences
    pub low_confidence_threshold: f64,
    /// Whether a clarifying question is generated when a result is uncertain
    pub clarification_enabled: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            low_confidence_threshold: LOW_CONFIDENCE_THRESHOLD,
            clarification_enabled: true,
        }
    }
}

impl PipelineConfig {
    pub fn low_confidence_threshold(mut self, threshold: f64) -> Self {
        self.low_confidence_threshold = threshold;
        self
    }

    pub fn clarification_enabled(mut self, enabled: bool) -> Self {
        self.clarification_enabled = enabled;
        self
    }
}

/// Process settings read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Local model served by Ollama (`DSPY_MODEL_NAME`)
    pub model_name: String,
    /// `OLLAMA_BASE_URL`
    pub ollama_url: String,
    /// Text file with one query per line (`ABC_INPUT_FILE`); stdin when unset
    pub input_file: Option<PathBuf>,
    /// `ABC_OUTPUT_DIR`
    pub output_dir: PathBuf,
    pub pipeline: PipelineConfig,
    /// `AWS_REGION`
    pub aws_region: String,
    /// Record field classified by the single-record service (`CSV_TEXT_COLUMN`)
    pub text_column: String,
    /// `BEDROCK_MODEL_ID`
    pub bedrock_model_id: String,
    /// `BEDROCK_API_KEY`, falling back to `AWS_BEARER_TOKEN_BEDROCK`
    pub bedrock_api_key: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL_NAME.to_string(),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            input_file: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            pipeline: PipelineConfig::default(),
            aws_region: DEFAULT_AWS_REGION.to_string(),
            text_column: DEFAULT_TEXT_COLUMN.to_string(),
            bedrock_model_id: DEFAULT_BEDROCK_MODEL_ID.to_string(),
            bedrock_api_key: None,
        }
    }
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let clarification_enabled = get("ABC_CLARIFICATION")
            .map(|value| parse_flag(&value))
            .unwrap_or(defaults.pipeline.clarification_enabled);

        Self {
            model_name: get("DSPY_MODEL_NAME").unwrap_or(defaults.model_name),
            ollama_url: get("OLLAMA_BASE_URL").unwrap_or(defaults.ollama_url),
            input_file: get("ABC_INPUT_FILE").map(PathBuf::from),
            output_dir: get("ABC_OUTPUT_DIR").map(PathBuf::from).unwrap_or(defaults.output_dir),
            pipeline: PipelineConfig {
                clarification_enabled,
                ..defaults.pipeline
            },
            aws_region: get("AWS_REGION").unwrap_or(defaults.aws_region),
            text_column: get("CSV_TEXT_COLUMN").unwrap_or(defaults.text_column),
            bedrock_model_id: get("BEDROCK_MODEL_ID").unwrap_or(defaults.bedrock_model_id),
            bedrock_api_key: get("BEDROCK_API_KEY").or_else(|| get("AWS_BEARER_TOKEN_BEDROCK")),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(value.to_lowercase().as_str(), "0" | "false" | "no" | "off")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(pairs: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> = pairs.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let settings = settings_from(&[]);
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.model_name, "phi3");
        assert_eq!(settings.text_column, "description");
        assert_eq!(settings.pipeline.low_confidence_threshold, 0.6);
        assert!(settings.pipeline.clarification_enabled);
        assert!(settings.input_file.is_none());
    }

    #[test]
    fn test_overrides() {
        let settings = settings_from(&[
            ("DSPY_MODEL_NAME", "llama3"),
            ("ABC_INPUT_FILE", " queries.txt "),
            ("ABC_CLARIFICATION", "off"),
            ("CSV_TEXT_COLUMN", "title"),
            ("AWS_BEARER_TOKEN_BEDROCK", "token"),
        ]);
        assert_eq!(settings.model_name, "llama3");
        assert_eq!(settings.input_file, Some(PathBuf::from("queries.txt")));
        assert!(!settings.pipeline.clarification_enabled);
        assert_eq!(settings.text_column, "title");
        assert_eq!(settings.bedrock_api_key.as_deref(), Some("token"));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let settings = settings_from(&[("ABC_INPUT_FILE", "   "), ("DSPY_MODEL_NAME", "")]);
        assert!(settings.input_file.is_none());
        assert_eq!(settings.model_name, "phi3");
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("1"));
        assert!(parse_flag("yes"));
        assert!(!parse_flag("FALSE"));
        assert!(!parse_flag("0"));
    }
}
