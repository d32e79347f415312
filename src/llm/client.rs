use anyhow::{Context, Result, anyhow};
use async_openai::{Client, config::OpenAIConfig};

use super::secrets::{
    API_KEY_ENV, ApiKeySource, prompt_for_api_key, resolve_configured_api_key, store_api_key,
};

pub const GENERATION_MODEL: &str = "gpt-4o-mini";

const MODEL_ENV: &str = "CARDSMITH_MODEL";

/// Model name plus credential, resolved once at startup and immutable for the
/// life of the process.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
}

impl LlmConfig {
    fn with_key(api_key: String) -> Self {
        let model = std::env::var(MODEL_ENV)
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| GENERATION_MODEL.to_string());
        Self { api_key, model }
    }
}

/// One configured connection to the generation provider.
pub struct LlmClient {
    pub(super) client: Client<OpenAIConfig>,
    pub(super) model: String,
}

impl LlmClient {
    pub fn from_config(config: &LlmConfig) -> Self {
        let openai_config = OpenAIConfig::new().with_api_key(&config.api_key);
        Self {
            client: Client::with_config(openai_config),
            model: config.model.clone(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Resolve a configured API key, falling back to an interactive prompt, and
/// build a client from it.
pub fn ensure_client(user_prompt: &str) -> Result<LlmClient> {
    let key = match resolve_configured_api_key()? {
        Some((api_key, _source)) => api_key,
        None => {
            let api_key = prompt_for_api_key(user_prompt)?;
            if api_key.is_empty() {
                return Err(anyhow!(
                    "No API key provided. Set {} or run `cardsmith llm key --set <KEY>`.",
                    API_KEY_ENV
                ));
            }
            store_api_key(&api_key)?;
            api_key
        }
    };
    Ok(LlmClient::from_config(&LlmConfig::with_key(key)))
}

pub async fn test_configured_api_key() -> Result<ApiKeySource> {
    let (key, source) = resolve_configured_api_key()?.ok_or_else(|| {
        anyhow!(
            "No API key configured. Set {} or run `cardsmith llm key --set <KEY>`.",
            API_KEY_ENV
        )
    })?;
    let client = LlmClient::from_config(&LlmConfig::with_key(key));
    healthcheck_client(&client).await?;
    Ok(source)
}

async fn healthcheck_client(client: &LlmClient) -> Result<()> {
    client
        .client
        .models()
        .list()
        .await
        .context("Failed to validate API key with OpenAI")?;
    Ok(())
}
