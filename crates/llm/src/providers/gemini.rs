//! Google Gemini provider.
//!
//! API: https://ai.google.dev/api/generate-content

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use crate::types::ProviderType;
use inkpipe_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

fn text_content(text: &str) -> GeminiContent {
    GeminiContent {
        parts: vec![GeminiPart {
            text: Some(text.to_string()),
        }],
    }
}

/// Gemini generation client.
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiClient {
    /// Create a client against the public endpoint.
    pub fn new(api_key: impl Into<String>, client: reqwest::Client) -> Self {
        Self::with_base_url(ProviderType::Gemini.default_endpoint(), api_key, client)
    }

    /// Create a client against a custom base URL.
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    fn to_gemini_request(&self, request: &LlmRequest) -> GeminiRequest {
        let generation_config = if request.temperature.is_some() || request.max_tokens.is_some() {
            Some(GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            })
        } else {
            None
        };

        GeminiRequest {
            contents: vec![text_content(&request.prompt)],
            system_instruction: request.system.as_deref().map(text_content),
            generation_config,
        }
    }

    fn convert_response(&self, response: GeminiResponse, model: &str) -> AppResult<LlmResponse> {
        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| {
                AppError::Backend("Gemini response contained no candidate text".to_string())
            })?;

        let usage = response
            .usage_metadata
            .map(|u| LlmUsage::new(u.prompt_token_count, u.candidates_token_count))
            .unwrap_or_default();

        Ok(LlmResponse {
            content: text,
            model: model.to_string(),
            usage,
        })
    }
}

#[async_trait::async_trait]
impl LlmClient for GeminiClient {
    fn provider_name(&self) -> &str {
        ProviderType::Gemini.as_str()
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::info!(model = %request.model, "Sending generation request to Gemini");
        tracing::debug!("Request: {:?}", request);

        let body = self.to_gemini_request(request);

        let response = self
            .client
            .post(self.endpoint(&request.model))
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Failed to send request to Gemini: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Backend(format!(
                "Gemini API error ({}): {}",
                status, error_text
            )));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| AppError::Backend(format!("Failed to parse Gemini response: {}", e)))?;

        let converted = self.convert_response(gemini_response, &request.model)?;
        tracing::info!(
            tokens = converted.usage.total_tokens,
            "Received completion from Gemini"
        );
        Ok(converted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GeminiClient {
        GeminiClient::new("test-key", reqwest::Client::new())
    }

    #[test]
    fn test_endpoint() {
        let client = GeminiClient::with_base_url(
            "http://localhost:8080/",
            "k",
            reqwest::Client::new(),
        );
        assert_eq!(
            client.endpoint("gemini-2.0-flash"),
            "http://localhost:8080/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn test_request_shape_with_system() {
        let request = LlmRequest::new("Topic is cats", "gemini-2.0-flash").with_system("Be concise.");
        let json = serde_json::to_value(client().to_gemini_request(&request)).unwrap();

        assert_eq!(json["contents"][0]["parts"][0]["text"], "Topic is cats");
        assert_eq!(json["system_instruction"]["parts"][0]["text"], "Be concise.");
        assert!(json.get("generationConfig").is_none());
    }

    #[test]
    fn test_request_shape_without_system() {
        let request = LlmRequest::new("hi", "gemini-2.0-flash").with_max_tokens(64);
        let json = serde_json::to_value(client().to_gemini_request(&request)).unwrap();

        assert!(json.get("system_instruction").is_none());
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 64);
    }

    #[test]
    fn test_convert_response() {
        let raw = r#"{
            "candidates": [{"content": {"parts": [{"text": "1. 标题"}], "role": "model"}}],
            "usageMetadata": {"promptTokenCount": 5, "candidatesTokenCount": 7}
        }"#;
        let parsed: GeminiResponse = serde_json::from_str(raw).unwrap();
        let response = client().convert_response(parsed, "gemini-2.0-flash").unwrap();

        assert_eq!(response.content, "1. 标题");
        assert_eq!(response.usage, LlmUsage::new(5, 7));
    }

    #[test]
    fn test_convert_response_without_candidates() {
        let parsed: GeminiResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        let result = client().convert_response(parsed, "gemini-2.0-flash");
        assert!(matches!(result, Err(AppError::Backend(_))));
    }
}
