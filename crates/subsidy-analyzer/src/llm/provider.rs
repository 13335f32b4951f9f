use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::error::{ConfigError, Result};
use crate::llm::{CompletionModel, GeminiClient, GenerationSettings, LlmError, OpenAiCompatibleClient};
use crate::secrets::resolve_secret;

const OPENAI_MODELS: &[&str] = &["gpt-4o-mini", "gpt-4o"];

const OPENROUTER_MODELS: &[&str] = &[
    "mistral/ministral-8b",
    "meta-llama/llama-3.3-70b-instruct",
    "qwen/qwen-2.5-72b-instruct",
    "deepseek/deepseek-chat-v3-0324:free",
    "google/gemini-2.0-flash-001",
    "anthropic/claude-3-haiku",
    "mistralai/mistral-medium",
];

const DEEPSEEK_MODELS: &[&str] = &["deepseek-chat"];

const GEMINI_MODELS: &[&str] = &[
    "gemini-1.5-flash",
    "gemini-1.5-pro",
    "gemini-1.5-flash-8b",
    "gemini-2.0-flash-lite",
];

const HUGGINGFACE_MODELS: &[&str] = &[
    "deepseek-ai/DeepSeek-R1",
    "meta-llama/Llama-3.1-8B-Instruct",
    "deepseek-ai/DeepSeek-R1-0528-Qwen3-8B",
    "mistralai/Mixtral-8x7B-Instruct-v0.1",
    "Qwen/QwQ-32B",
    "nvidia/Llama-3.1-Nemotron-70B-Instruct-HF",
    "deepseek-ai/DeepSeek-R1-Distill-Qwen-32B",
];

/// Hosted backend serving a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    OpenAi,
    OpenRouter,
    DeepSeek,
    HuggingFace,
    Gemini,
}

impl ModelProvider {
    pub const ALL: [ModelProvider; 5] = [
        ModelProvider::OpenRouter,
        ModelProvider::OpenAi,
        ModelProvider::Gemini,
        ModelProvider::HuggingFace,
        ModelProvider::DeepSeek,
    ];

    /// Looks the model name up in the static per-provider lists.
    pub fn for_model(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|provider| provider.models().contains(&name))
    }

    pub fn models(&self) -> &'static [&'static str] {
        match self {
            ModelProvider::OpenAi => OPENAI_MODELS,
            ModelProvider::OpenRouter => OPENROUTER_MODELS,
            ModelProvider::DeepSeek => DEEPSEEK_MODELS,
            ModelProvider::HuggingFace => HUGGINGFACE_MODELS,
            ModelProvider::Gemini => GEMINI_MODELS,
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ModelProvider::OpenAi => "https://api.openai.com/v1",
            ModelProvider::OpenRouter => "https://openrouter.ai/api/v1",
            ModelProvider::DeepSeek => "https://api.deepseek.com/v1",
            ModelProvider::HuggingFace => "https://router.huggingface.co/v1",
            ModelProvider::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        }
    }

    pub fn api_key_env(&self) -> &'static str {
        match self {
            ModelProvider::OpenAi => "OPENAI_API_KEY",
            ModelProvider::OpenRouter => "OPENROUTER_API_KEY",
            ModelProvider::DeepSeek => "DEEPSEEK_API_KEY",
            ModelProvider::HuggingFace => "HF_TOKEN",
            ModelProvider::Gemini => "GOOGLE_API_KEY",
        }
    }

    /// Environment variable that may override the default endpoint.
    pub fn base_url_env(&self) -> Option<&'static str> {
        match self {
            ModelProvider::OpenAi => Some("OPENAI_API_BASE"),
            ModelProvider::OpenRouter => Some("OPENROUTER_BASE_URL"),
            _ => None,
        }
    }

    /// Explicit config override first, then the model-name lookup.
    pub fn resolve(config: &ModelConfig) -> std::result::Result<Self, ConfigError> {
        config
            .provider
            .or_else(|| Self::for_model(&config.name))
            .ok_or_else(|| ConfigError::UnknownModel {
                name: config.name.clone(),
            })
    }
}

impl fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModelProvider::OpenAi => "openai",
            ModelProvider::OpenRouter => "openrouter",
            ModelProvider::DeepSeek => "deepseek",
            ModelProvider::HuggingFace => "huggingface",
            ModelProvider::Gemini => "gemini",
        };
        f.write_str(name)
    }
}

/// Builds the completion client for `config`.
///
/// Endpoint priority: `model.base_url`, the provider's base-URL environment
/// variable, the provider default. The API key is resolved from
/// `api_key` / `api_key_file` / `api_key_env`, falling back to the provider's
/// conventional variable.
pub fn build_model(config: &ModelConfig) -> Result<Box<dyn CompletionModel>> {
    let provider = ModelProvider::resolve(config)?;

    let env_name = config
        .api_key_env
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or(provider.api_key_env());
    let api_key = resolve_secret(
        config.api_key.as_deref(),
        config.api_key_file.as_deref(),
        Some(env_name),
    )
    .map_err(|source| LlmError::MissingApiKey { provider, source })?;

    let base_url = endpoint_for(provider, config.base_url.as_deref());
    let settings = GenerationSettings {
        temperature: config.temperature,
        max_tokens: config.max_tokens,
        timeout: Duration::from_secs(config.timeout_secs),
    };

    tracing::debug!(
        provider = %provider,
        model = %config.name,
        base_url = %base_url,
        "Building completion model"
    );

    let model: Box<dyn CompletionModel> = match provider {
        ModelProvider::Gemini => Box::new(GeminiClient::new(
            &config.name,
            api_key,
            base_url,
            settings,
        )?),
        _ => Box::new(OpenAiCompatibleClient::new(
            &config.name,
            api_key,
            base_url,
            settings,
        )?),
    };

    Ok(model)
}

fn endpoint_for(provider: ModelProvider, configured: Option<&str>) -> String {
    if let Some(url) = configured.filter(|u| !u.is_empty()) {
        return url.trim_end_matches('/').to_string();
    }

    provider
        .base_url_env()
        .and_then(|name| std::env::var(name).ok())
        .filter(|url| !url.is_empty())
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or_else(|| provider.default_base_url().to_string())
}
