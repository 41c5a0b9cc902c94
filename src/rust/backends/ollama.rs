//! Local model backend served by Ollama.
//!
//! See: <https://github.com/ollama/ollama/blob/main/docs/api.md#generate-a-completion>

use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{check_status, TextGenerator};
use crate::classifier::capability::{parse_completion, render_prompt};
use crate::config::{DEFAULT_MODEL_NAME, DEFAULT_OLLAMA_URL};
use crate::{ClassifierCapability, ClassifierError, Invocation, Prediction, Result};

/// Client for a local Ollama server.
///
/// Every invocation is rendered into a single prompt and sent to `/api/generate`
/// without streaming; the completion is parsed back into named fields.
#[derive(Debug, Clone)]
pub struct OllamaBackend {
    model: String,
    base_url: String,
    temperature: Option<f32>,
    http: Client,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerateOptions>,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    error: Option<String>,
}

impl Default for OllamaBackend {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL_NAME)
    }
}

impl OllamaBackend {
    /// Creates a backend for `model` on the default local server.
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_base_url(model, DEFAULT_OLLAMA_URL)
    }

    /// Creates a backend with a custom server URL (also used for testing with wiremock).
    pub fn with_base_url(model: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            temperature: None,
            http: Client::new(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends one prompt and returns the raw completion text.
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);
        debug!("POST {} (model {}, {} prompt bytes)", url, self.model, prompt.len());

        let response = self.http
            .post(&url)
            .json(&GenerateRequest {
                model: &self.model,
                prompt,
                stream: false,
                options: self.temperature.map(|temperature| GenerateOptions { temperature }),
            })
            .send()
            .await?;
        let response = check_status(response).await?;

        let body: GenerateResponse = response.json().await?;
        if let Some(message) = body.error {
            error!("Ollama returned an error for model {}: {}", self.model, message);
            return Err(ClassifierError::BackendError(message));
        }
        Ok(body.response)
    }
}

#[async_trait]
impl ClassifierCapability for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn invoke(&self, invocation: &Invocation) -> Result<Prediction> {
        let prompt = render_prompt(invocation);
        let completion = self.complete(&prompt).await?;
        Ok(parse_completion(invocation.signature, &completion))
    }
}

#[async_trait]
impl TextGenerator for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.complete(prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = GenerateRequest {
            model: "phi3",
            prompt: "hi",
            stream: false,
            options: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"model": "phi3", "prompt": "hi", "stream": false}));
    }

    #[test]
    fn test_base_url_normalized() {
        let backend = OllamaBackend::with_base_url("phi3", "http://localhost:11434/");
        assert_eq!(backend.base_url, "http://localhost:11434");
        assert_eq!(OllamaBackend::default().model(), "phi3");
    }
}
