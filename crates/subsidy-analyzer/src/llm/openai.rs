//! OpenAI-compatible chat completions (OpenAI, OpenRouter, DeepSeek and the
//! Hugging Face router all speak this protocol).

use reqwest::blocking::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::llm::{Completion, CompletionModel, GenerationSettings, LlmError, TokenUsage};

pub struct OpenAiCompatibleClient {
    http_client: Client,
    model: String,
    api_key: SecretString,
    base_url: String,
    settings: GenerationSettings,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

impl OpenAiCompatibleClient {
    pub fn new(
        model: &str,
        api_key: SecretString,
        base_url: String,
        settings: GenerationSettings,
    ) -> Result<Self, LlmError> {
        let http_client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| LlmError::ClientBuild(e.to_string()))?;

        Ok(Self {
            http_client,
            model: model.to_string(),
            api_key,
            base_url,
            settings,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn request_body<'a>(&'a self, system: &'a str, user: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: [
                Message {
                    role: "system",
                    content: system,
                },
                Message {
                    role: "user",
                    content: user,
                },
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        }
    }
}

impl CompletionModel for OpenAiCompatibleClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn complete(&self, system: &str, user: &str) -> Result<Completion, LlmError> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(self.endpoint())
            .bearer_auth(self.api_key.expose_secret())
            .json(&self.request_body(system, user))
            .send()
            .map_err(|e| {
                tracing::warn!(error = %e, model = %self.model, "Completion request failed");
                LlmError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            tracing::warn!(status = %status, model = %self.model, "Completion API error");
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response
            .json()
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let text = parse_content(&body)?;
        let usage = match body.usage {
            Some(usage) => TokenUsage {
                model_name: self.model.clone(),
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            },
            None => TokenUsage::estimate(&self.model, system, user, &text),
        };

        tracing::debug!(
            model = %self.model,
            duration_ms = start.elapsed().as_millis() as u64,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "Chat completion"
        );

        Ok(Completion { text, usage })
    }
}

/// A choice with null or blank content is still a completion; only a body
/// without choices is an error.
fn parse_content(body: &ChatResponse) -> Result<String, LlmError> {
    body.choices
        .first()
        .map(|choice| choice.message.content.clone().unwrap_or_default())
        .ok_or(LlmError::EmptyResponse)
}
