//! services/api/src/adapters/completion_llm.rs
//!
//! This module contains the adapter for the text-completion LLM.
//! It implements the `CompletionService` port from the `core` crate against any
//! OpenAI-compatible chat-completions endpoint (Gemini exposes one).

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use course_advisor_core::ports::{CompletionService, PortError, PortResult};
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `CompletionService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiCompletionAdapter {
    client: Client<OpenAIConfig>,
}

impl OpenAiCompletionAdapter {
    /// Creates a new `OpenAiCompletionAdapter`.
    pub fn new(client: Client<OpenAIConfig>) -> Self {
        Self { client }
    }

    /// Builds a client for the given API base and key.
    pub fn from_credentials(api_base: &str, api_key: &str) -> Self {
        let config = OpenAIConfig::new()
            .with_api_base(api_base)
            .with_api_key(api_key);
        Self::new(Client::with_config(config))
    }
}

/// A single-turn request: the whole prompt goes in one user message.
fn build_request(model: &str, prompt: &str) -> Result<CreateChatCompletionRequest, OpenAIError> {
    let messages: Vec<ChatCompletionRequestMessage> = vec![
        ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()?
            .into(),
    ];

    CreateChatCompletionRequestArgs::default()
        .model(model)
        .messages(messages)
        .n(1)
        .build()
}

//=========================================================================================
// `CompletionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CompletionService for OpenAiCompletionAdapter {
    /// Sends the prompt as a single user message and returns the first choice's text.
    async fn complete(&self, model: &str, prompt: &str) -> PortResult<String> {
        let request =
            build_request(model, prompt).map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Upstream(e.to_string()))?;

        debug!(model, choices = response.choices.len(), "Completion received");

        // Extract the text content from the first choice in the response.
        match response.choices.into_iter().next() {
            Some(choice) => choice.message.content.ok_or_else(|| {
                PortError::Upstream("Completion response contained no text content.".to_string())
            }),
            None => Err(PortError::Upstream(
                "Completion service returned no choices in its response.".to_string(),
            )),
        }
    }
}
