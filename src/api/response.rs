//! Response body decoding
//!
//! The upstream sometimes writes diagnostic text before the JSON payload.
//! [`extract_json`] skips that prefix and decodes the first JSON document it
//! finds.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::ClientError;

/// Decodes the first JSON value in `body`, skipping any leading noise
///
/// The whole body is tried first. Failing that, decoding is attempted from
/// each `{` or `[` in turn; the first position that yields a complete value
/// wins and anything after that value is ignored.
pub fn extract_json(body: &str) -> Result<Value, ClientError> {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return Ok(value);
    }

    for (start, _) in body.match_indices(['{', '[']) {
        let mut stream = serde_json::Deserializer::from_str(&body[start..]).into_iter::<Value>();
        if let Some(Ok(value)) = stream.next() {
            if start > 0 {
                tracing::debug!(skipped = start, "stripped non-JSON prefix from response");
            }
            return Ok(value);
        }
    }

    Err(ClientError::MalformedResponse(format!(
        "no JSON payload in response: {}",
        preview(body)
    )))
}

/// Decodes `body` into `T`, tolerating leading noise
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ClientError> {
    let value = extract_json(body)?;
    from_value(value)
}

/// Converts an already extracted JSON value into `T`
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, ClientError> {
    serde_json::from_value(value)
        .map_err(|e| ClientError::MalformedResponse(format!("unexpected JSON shape: {}", e)))
}

fn preview(body: &str) -> String {
    const MAX: usize = 120;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
