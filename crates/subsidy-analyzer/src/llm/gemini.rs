//! Google Gemini `generateContent` client.

use reqwest::blocking::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::llm::{Completion, CompletionModel, GenerationSettings, LlmError, TokenUsage};

pub struct GeminiClient {
    http_client: Client,
    model: String,
    api_key: SecretString,
    base_url: String,
    settings: GenerationSettings,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

impl GeminiClient {
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
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn request_body<'a>(&self, system: &'a str, user: &'a str) -> GenerateRequest<'a> {
        GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: [Part { text: system }],
            },
            contents: [Content {
                role: Some("user"),
                parts: [Part { text: user }],
            }],
            generation_config: GenerationConfig {
                temperature: self.settings.temperature,
                max_output_tokens: self.settings.max_tokens,
            },
        }
    }
}

impl CompletionModel for GeminiClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn complete(&self, system: &str, user: &str) -> Result<Completion, LlmError> {
        let start = std::time::Instant::now();

        // key goes in a header so it never shows up in logged URLs
        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&self.request_body(system, user))
            .send()
            .map_err(|e| {
                tracing::warn!(error = %e, model = %self.model, "Gemini request failed");
                LlmError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            tracing::warn!(status = %status, model = %self.model, "Gemini API error");
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateResponse = response
            .json()
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let text = parse_text(&body)?;
        let usage = match &body.usage_metadata {
            Some(meta) => TokenUsage {
                model_name: self.model.clone(),
                input_tokens: meta.prompt_token_count,
                output_tokens: meta.candidates_token_count,
            },
            None => TokenUsage::estimate(&self.model, system, user, &text),
        };

        tracing::debug!(
            model = %self.model,
            duration_ms = start.elapsed().as_millis() as u64,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "Gemini completion"
        );

        Ok(Completion { text, usage })
    }
}

/// Joins the text parts of the first candidate.
fn parse_text(body: &GenerateResponse) -> Result<String, LlmError> {
    let candidate = body.candidates.first().ok_or(LlmError::EmptyResponse)?;
    Ok(candidate
        .content
        .as_ref()
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|part| part.text.as_deref())
                .collect()
        })
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GeminiClient {
        GeminiClient::new(
            "gemini-1.5-flash",
            SecretString::from("g-test".to_string()),
            "https://generativelanguage.googleapis.com/v1beta".to_string(),
            GenerationSettings::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_endpoint() {
        assert_eq!(
            client().endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let client = client();
        let body = serde_json::to_value(client.request_body("sys", "usr")).unwrap();

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "sys");
        assert!(body["systemInstruction"].get("role").is_none());
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "usr");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 4000);
    }

    #[test]
    fn test_parse_multi_part_candidate() {
        let body: GenerateResponse = serde_json::from_str(
            r#"{
                "candidates": [{"content": {"role": "model", "parts": [{"text": "{\"a\""}, {"text": ": 1}"}]}}],
                "usageMetadata": {"promptTokenCount": 80, "candidatesTokenCount": 12, "totalTokenCount": 92}
            }"#,
        )
        .unwrap();

        assert_eq!(parse_text(&body).unwrap(), "{\"a\": 1}");
        let usage = body.usage_metadata.unwrap();
        assert_eq!(usage.prompt_token_count, 80);
        assert_eq!(usage.candidates_token_count, 12);
    }

    #[test]
    fn test_parse_blocked_candidate_is_blank_text() {
        let body: GenerateResponse =
            serde_json::from_str(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).unwrap();
        assert_eq!(parse_text(&body).unwrap(), "");
    }

    #[test]
    fn test_parse_without_candidates() {
        let body: GenerateResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(matches!(parse_text(&body), Err(LlmError::EmptyResponse)));
    }
}
