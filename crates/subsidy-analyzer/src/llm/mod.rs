//! Single-shot text completion against hosted language models.
//!
//! The pipeline only sees [`CompletionModel`]; [`build_model`] picks the
//! concrete client for the configured model name.

pub mod gemini;
pub mod openai;
pub mod provider;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::secrets::SecretError;

pub use gemini::GeminiClient;
pub use openai::OpenAiCompatibleClient;
pub use provider::{build_model, ModelProvider};

/// Rough words-to-tokens ratio used when a provider reports no usage.
const TOKENS_PER_WORD: f64 = 1.3;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Missing API key for {provider}: {source}")]
    MissingApiKey {
        provider: ModelProvider,
        #[source]
        source: SecretError,
    },

    #[error("Failed to build model client: {0}")]
    ClientBuild(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected API response: {0}")]
    Parse(String),

    #[error("Model response contained no completion")]
    EmptyResponse,
}

/// Token usage snapshot for one completion call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub model_name: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    /// Word-count estimate for providers that do not report usage.
    pub fn estimate(model_name: &str, system: &str, user: &str, output: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            input_tokens: estimate_tokens(system) + estimate_tokens(user),
            output_tokens: estimate_tokens(output),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub usage: TokenUsage,
}

/// One system + user message pair in, one text answer out. No streaming,
/// no tool calls, no structured-output mode.
pub trait CompletionModel: Send + Sync {
    fn model_name(&self) -> &str;

    fn complete(&self, system: &str, user: &str) -> Result<Completion, LlmError>;
}

/// Sampling and transport limits shared by every provider client.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_tokens: 4000,
            timeout: Duration::from_secs(120),
        }
    }
}

pub fn estimate_tokens(text: &str) -> u64 {
    let words = text.split_whitespace().count();
    (words as f64 * TOKENS_PER_WORD).ceil() as u64
}
