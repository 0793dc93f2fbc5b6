//! Defensive extraction of structured data from model output.

use crate::errors::DecodeError;
use serde::de::DeserializeOwned;

/// Extract the first JSON document embedded in `text`.
///
/// Even with a JSON response mime type requested, providers occasionally
/// prepend prose or wrap the payload in a code fence. Scan to the first
/// `{` or `[` and stream-parse a single value from there; trailing noise
/// after the document is ignored.
pub fn extract_json(text: &str) -> Result<serde_json::Value, DecodeError> {
    let text = text.trim();
    let start = text
        .find('{')
        .or_else(|| text.find('['))
        .ok_or(DecodeError::NoJson)?;
    let segment = &text[start..];

    serde_json::Deserializer::from_str(segment)
        .into_iter::<serde_json::Value>()
        .next()
        .ok_or(DecodeError::NoJson)?
        .map_err(DecodeError::Invalid)
}

/// Extract and deserialize into `T` in one step.
pub fn extract_as<T: DeserializeOwned>(text: &str) -> Result<T, DecodeError> {
    let value = extract_json(text)?;
    serde_json::from_value(value).map_err(DecodeError::Invalid)
}
