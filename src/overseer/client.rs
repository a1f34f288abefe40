//! Classifier capability interface and its production implementation.
//!
//! The production classifier talks to a local Ollama instance through its
//! OpenAI-compatible endpoint. The trait exists so the gateway state machine
//! can be exercised with deterministic doubles and no network.

use anyhow::{Context, Result, anyhow};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestSystemMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
};
use async_openai::Client;
use tracing::debug;

use super::prompt;

/// Default OpenAI-compatible endpoint of a local Ollama instance.
pub const DEFAULT_API_BASE: &str = "http://localhost:11434/v1";

/// Default audit model.
pub const DEFAULT_MODEL: &str = "llama3.2:1b";

/// A swappable semantic-classification capability.
///
/// Returns the raw model response text; parsing and fail-closed handling
/// belong to the [`Auditor`](super::Auditor). Errors are transport-level
/// (connection refused, non-success status, empty response).
pub trait Classifier: Send + Sync {
    fn classify(
        &self,
        command: &str,
        intent: &str,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Classifier backed by an OpenAI-compatible chat endpoint (local Ollama).
pub struct OllamaClassifier {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OllamaClassifier {
    pub fn new(api_base: impl Into<String>, model: impl Into<String>) -> Self {
        let config = OpenAIConfig::new().with_api_base(api_base);
        Self {
            client: Client::with_config(config),
            model: model.into(),
        }
    }

    /// Classifier pointed at the default local Ollama endpoint and model.
    pub fn local_default() -> Self {
        Self::new(DEFAULT_API_BASE, DEFAULT_MODEL)
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Classifier for OllamaClassifier {
    fn classify(
        &self,
        command: &str,
        intent: &str,
    ) -> impl Future<Output = Result<String>> + Send {
        let audit_prompt = prompt::build_audit_prompt(command, intent);
        async move {
            let request = CreateChatCompletionRequestArgs::default()
                .model(&self.model)
                .response_format(ResponseFormat::JsonObject)
                .messages([ChatCompletionRequestSystemMessageArgs::default()
                    .content(audit_prompt)
                    .build()?
                    .into()])
                .build()?;

            let response = self
                .client
                .chat()
                .create(request)
                .await
                .context("classifier request failed")?;

            debug!(model = %self.model, "classifier responded");

            response
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .ok_or_else(|| anyhow!("classifier returned an empty response"))
        }
    }
}
