use crate::errors::ProviderError;
use async_trait::async_trait;

mod fake;
mod gemini;

pub use fake::FakeClient;
pub use gemini::GeminiClient;

#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub text: String,
    pub provider: &'static str,
    pub model: String,
}

/// Capability interface for the external structured-generation service.
///
/// Every pipeline stage takes one of these instead of a vendor client, so a
/// scripted [`FakeClient`] can stand in during tests and offline play.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// One blocking request/response call. `response_schema` constrains the
    /// output shape on providers that support it; others may ignore it.
    async fn complete(
        &self,
        prompt: &str,
        response_schema: Option<&serde_json::Value>,
    ) -> Result<LlmResponse, ProviderError>;

    fn provider_name(&self) -> &'static str;
}
