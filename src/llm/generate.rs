use anyhow::{Result, anyhow};
use async_openai::types::{
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};

use super::client::LlmClient;
use super::prompt::SYSTEM_PROMPT;
use crate::pipeline::CardSource;

const MAX_COMPLETION_TOKENS: u32 = 16_000;

/// One chat-completion round trip: prompt in, trimmed raw reply text out.
/// No retry; failures surface to the orchestrator.
pub async fn request_card_batch(client: &LlmClient, prompt: &str) -> Result<String> {
    let request = CreateChatCompletionRequestArgs::default()
        .model(client.model())
        .max_completion_tokens(MAX_COMPLETION_TOKENS)
        .messages([
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_PROMPT)
                .build()?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?
                .into(),
        ])
        .build()?;

    let response = client.client.chat().create(request).await?;

    let output = response
        .choices
        .first()
        .and_then(|c| c.message.content.clone())
        .ok_or_else(|| anyhow!("No content returned from model"))?;

    Ok(output.trim().to_string())
}

impl CardSource for LlmClient {
    async fn raw_card_batch(&self, prompt: &str) -> Result<String> {
        request_card_batch(self, prompt).await
    }
}
