//! Generative model access.
//!
//! The engine reaches the model through a single capability: send one role's
//! instruction template plus a JSON input object, get free text back. The
//! trait keeps the orchestration logic testable and provider-agnostic; the
//! shipped implementation talks to any OpenAI-compatible chat endpoint.

use anyhow::{Context, Result};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;
use serde_json::{Value, json};

/// One model call: fixed role instructions plus a structured input object,
/// returning whatever text the model produced (ideally JSON, not guaranteed).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, instructions: &str, input: Value) -> Result<String>;
}

/// `CompletionClient` for any OpenAI-compatible API (OpenAI itself, or
/// Gemini through its OpenAI-compatible base URL).
pub struct OpenAICompatibleClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAICompatibleClient {
    pub fn new(config: OpenAIConfig, model: String) -> Self {
        Self {
            client: Client::with_config(config),
            model,
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAICompatibleClient {
    async fn complete(&self, instructions: &str, input: Value) -> Result<String> {
        // The input object carries explicit format hints alongside the data;
        // models follow them more reliably than instructions alone.
        let mut payload = input;
        if let Value::Object(map) = &mut payload {
            map.insert("responseFormat".to_string(), json!("json"));
            map.insert(
                "formatInstructions".to_string(),
                json!("Return only valid JSON without any markdown formatting or additional text."),
            );
        }

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(instructions.to_string())
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(serde_json::to_string(&payload)?)
                    .build()?
                    .into(),
            ])
            .build()?;

        let response = self.client.chat().create(request).await?;
        let content = response
            .choices
            .first()
            .context("No response choice from model")?
            .message
            .content
            .as_ref()
            .context("No content in model response")?;
        Ok(content.clone())
    }
}
