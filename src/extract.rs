use std::fmt;

use serde_json::Value;

use crate::transport::ResponseBody;

/// Answer returned when the service replied without a usable `response` field.
pub const NO_RESPONSE: &str = "No response from Ollama";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedAnswer {
    text: String,
    sentinel: bool,
}

impl GeneratedAnswer {
    fn missing() -> Self {
        Self {
            text: NO_RESPONSE.to_string(),
            sentinel: true,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_sentinel(&self) -> bool {
        self.sentinel
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for GeneratedAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Decode the `response` string out of a completed body.
///
/// A body that is not JSON, or has no string `response` field, yields the
/// [`NO_RESPONSE`] sentinel rather than an error.
pub fn extract(body: &ResponseBody) -> GeneratedAnswer {
    let value: Value = match serde_json::from_slice(body.as_bytes()) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, bytes = body.len(), "response body is not JSON");
            return GeneratedAnswer::missing();
        }
    };

    match value.get("response").and_then(Value::as_str) {
        Some(text) => GeneratedAnswer {
            text: text.to_string(),
            sentinel: false,
        },
        None => {
            tracing::warn!("response field missing from generation reply");
            GeneratedAnswer::missing()
        }
    }
}
