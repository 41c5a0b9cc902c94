//! Hosted model backend on the AWS Bedrock runtime `InvokeModel` API.
//!
//! Authentication uses a Bedrock API key sent as a bearer token.
//! See: <https://docs.aws.amazon.com/bedrock/latest/APIReference/API_runtime_InvokeModel.html>

use async_trait::async_trait;
use log::debug;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use super::{check_status, TextGenerator};
use crate::config::{DEFAULT_AWS_REGION, DEFAULT_BEDROCK_MODEL_ID};
use crate::Result;

#[derive(Debug, Clone)]
pub struct BedrockClient {
    base_url: String,
    model_id: String,
    api_key: Option<String>,
    http: Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InvokeRequest<'a> {
    input_text: &'a str,
}

impl Default for BedrockClient {
    fn default() -> Self {
        Self::new(DEFAULT_AWS_REGION, DEFAULT_BEDROCK_MODEL_ID)
    }
}

impl BedrockClient {
    /// Creates a client for the regional Bedrock runtime endpoint.
    pub fn new(region: &str, model_id: impl Into<String>) -> Self {
        Self::with_base_url(format!("https://bedrock-runtime.{}.amazonaws.com", region), model_id)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(base_url: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model_id: model_id.into(),
            api_key: None,
            http: Client::new(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    fn invoke_url(&self) -> String {
        format!("{}/model/{}/invoke", self.base_url, self.model_id)
    }
}

#[async_trait]
impl TextGenerator for BedrockClient {
    fn name(&self) -> &str {
        "bedrock"
    }

    /// Returns `outputText` of the model response, or an empty string when it is absent.
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = self.invoke_url();
        debug!("POST {}", url);

        let mut request = self.http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(&InvokeRequest { input_text: prompt });
        if let Some(key) = &self.api_key {
            request = request.header(AUTHORIZATION, format!("Bearer {}", key));
        }

        let response = check_status(request.send().await?).await?;
        let body: Value = serde_json::from_slice(&response.bytes().await?)?;
        Ok(body.get("outputText")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }
}
