use std::error::Error as StdError;

use thiserror::Error;

use crate::prompt::PromptKind;

#[derive(Error, Debug)]
pub enum ChatboxError {
    #[error("catalog error: {0}")]
    Catalog(String),

    #[error("{kind} prompt is {len} bytes on the wire, limit is {limit}")]
    PromptTooLarge {
        kind: PromptKind,
        len: usize,
        limit: usize,
    },

    #[error("Ollama request failed: {reason}")]
    Transport { reason: String },

    #[error("configuration error: {0}")]
    Config(String),
}

impl ChatboxError {
    pub fn transport(reason: impl Into<String>) -> Self {
        ChatboxError::Transport {
            reason: reason.into(),
        }
    }
}

impl From<sqlx::Error> for ChatboxError {
    fn from(e: sqlx::Error) -> Self {
        ChatboxError::Catalog(e.to_string())
    }
}

// reqwest's top-level message hides the cause ("error sending request"), so walk the chain.
impl From<reqwest::Error> for ChatboxError {
    fn from(e: reqwest::Error) -> Self {
        let mut reason = e.to_string();
        if e.is_timeout() && !reason.contains("timed out") {
            reason.push_str(": operation timed out");
        }
        let mut source = e.source();
        while let Some(cause) = source {
            let text = cause.to_string();
            if !reason.contains(&text) {
                reason.push_str(": ");
                reason.push_str(&text);
            }
            source = cause.source();
        }
        ChatboxError::Transport { reason }
    }
}

pub type Result<T> = std::result::Result<T, ChatboxError>;
