use async_trait::async_trait;
use log::error;
use reqwest::Response;

use crate::{ClassifierError, Result};

mod bedrock;
mod ollama;

pub use bedrock::BedrockClient;
pub use ollama::OllamaBackend;

/// A hosted model that turns one prompt into raw text, with no output schema.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Turns a non-success HTTP status into `ApiError`, keeping the response body as message.
pub(crate) async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    error!("Backend answered {}: {}", status, message);
    Err(ClassifierError::ApiError {
        status: status.as_u16(),
        message,
    })
}
