use thiserror::Error;

/// Failure talking to the generation service itself.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{provider} API error (status {status}): {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{provider} response missing content")]
    MissingContent { provider: &'static str },

    #[error("fake client has no scripted response left")]
    Exhausted,
}

/// Failure turning free-form model output into structured data. Models wrap
/// JSON in prose or fences often enough that this is a first-class error,
/// not an exceptional edge case.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("no JSON document found in model output")]
    NoJson,

    #[error("invalid JSON in model output: {0}")]
    Invalid(#[from] serde_json::Error),

    #[error("model output missing field `{0}`")]
    MissingField(&'static str),
}

/// Either leg of a structured-generation call can fail: the call itself, or
/// decoding what came back.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[derive(Debug, Error)]
#[error("catalog error: {0}")]
pub struct CatalogError(pub String);
