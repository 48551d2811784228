//! HTTP call to the local generation service.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;

use crate::config::ChatboxConfig;
use crate::error::{ChatboxError, Result};
use crate::prompt::Prompt;

/// Append-only accumulator for a response body that arrives in chunks.
#[derive(Debug, Default)]
pub struct ResponseBuffer {
    data: Vec<u8>,
    chunks: usize,
}

impl ResponseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, chunk: &[u8]) {
        self.data.extend_from_slice(chunk);
        self.chunks += 1;
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Freeze the buffer once the exchange has completed.
    pub fn finish(self) -> ResponseBody {
        tracing::trace!(chunks = self.chunks, bytes = self.data.len(), "response complete");
        ResponseBody {
            bytes: self.data.into_boxed_slice(),
        }
    }
}

/// A complete response body. Only produced by [`ResponseBuffer::finish`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseBody {
    bytes: Box<[u8]>,
}

impl ResponseBody {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl From<&[u8]> for ResponseBody {
    fn from(bytes: &[u8]) -> Self {
        let mut buffer = ResponseBuffer::new();
        buffer.append(bytes);
        buffer.finish()
    }
}

#[async_trait]
pub trait GenerationTransport: Send + Sync {
    async fn generate(&self, prompt: &Prompt) -> Result<ResponseBody>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

pub struct OllamaTransport {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

impl OllamaTransport {
    pub fn new(config: &ChatboxConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl GenerationTransport for OllamaTransport {
    async fn generate(&self, prompt: &Prompt) -> Result<ResponseBody> {
        let request = GenerateRequest {
            model: &self.model,
            prompt: prompt.as_str(),
            stream: false,
        };
        let payload = serde_json::to_vec(&request)
            .map_err(|e| ChatboxError::transport(format!("failed to encode request: {}", e)))?;

        let mut response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        let mut buffer = ResponseBuffer::new();
        while let Some(chunk) = response.chunk().await? {
            buffer.append(&chunk);
        }
        let body = buffer.finish();

        tracing::debug!(
            status = %status,
            bytes = body.len(),
            model = %self.model,
            "generation finished"
        );

        if !status.is_success() {
            return Err(ChatboxError::transport(status_reason(status, &body)));
        }

        Ok(body)
    }
}

fn status_reason(status: reqwest::StatusCode, body: &ResponseBody) -> String {
    let detail = serde_json::from_slice::<serde_json::Value>(body.as_bytes())
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string));

    match detail {
        Some(detail) => format!("HTTP status {}: {}", status, detail),
        None => format!("HTTP status {}", status),
    }
}
