use super::{LlmClient, LlmResponse};
use crate::errors::ProviderError;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Per-request ceiling; expiry surfaces as a transport error like any other
/// network failure.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct GeminiClient {
    pub model: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self::with_model(api_key, DEFAULT_MODEL.to_string())
    }

    pub fn with_model(api_key: String, model: String) -> Self {
        Self {
            model,
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

pub(crate) fn request_body(
    prompt: &str,
    response_schema: Option<&serde_json::Value>,
) -> serde_json::Value {
    let mut generation_config = json!({ "responseMimeType": "application/json" });
    if let Some(schema) = response_schema {
        generation_config["responseSchema"] = schema.clone();
    }
    json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": generation_config,
    })
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(
        &self,
        prompt: &str,
        response_schema: Option<&serde_json::Value>,
    ) -> Result<LlmResponse, ProviderError> {
        let url = format!("{}/{}:generateContent", API_BASE, self.model);
        let body = request_body(prompt, response_schema);

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_else(|_| String::new());
            return Err(ProviderError::Api {
                provider: "gemini",
                status,
                body,
            });
        }

        let json: serde_json::Value = resp.json().await?;

        // Parse candidates[0].content.parts[0].text
        let text = json
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(|v| v.as_str())
            .ok_or(ProviderError::MissingContent { provider: "gemini" })?
            .to_string();

        Ok(LlmResponse {
            text,
            provider: "gemini",
            model: self.model.clone(),
        })
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}
