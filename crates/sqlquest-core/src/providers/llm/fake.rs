use super::{LlmClient, LlmResponse};
use crate::errors::ProviderError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Scripted stand-in for the generation service.
///
/// With a fixed response it answers every call identically; with a script it
/// consumes one canned response per call and errors once the script runs
/// dry, which makes "this stage was never called" provable in tests via
/// [`FakeClient::remaining`].
#[derive(Debug, Default)]
pub struct FakeClient {
    fixed: Option<String>,
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(response: impl Into<String>) -> Self {
        Self {
            fixed: Some(response.into()),
            ..Self::default()
        }
    }

    pub fn scripted<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Scripted responses not yet consumed.
    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }

    /// Every prompt this client has been called with, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for FakeClient {
    async fn complete(
        &self,
        prompt: &str,
        _response_schema: Option<&serde_json::Value>,
    ) -> Result<LlmResponse, ProviderError> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        let text = if let Some(fixed) = &self.fixed {
            fixed.clone()
        } else {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or(ProviderError::Exhausted)?
        };

        Ok(LlmResponse {
            text,
            provider: "fake",
            model: "fake".to_string(),
        })
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}
