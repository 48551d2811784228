//! Prompt templates and the wire-size check.

use std::borrow::Cow;
use std::fmt;

use crate::error::{ChatboxError, Result};
use crate::schema::SchemaSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    GenerateSql,
    ExplainQuery,
    ExplainPlan,
}

impl PromptKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptKind::GenerateSql => "generate_sql",
            PromptKind::ExplainQuery => "explain_query",
            PromptKind::ExplainPlan => "explain_plan",
        }
    }
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maximum escaped prompt size, in bytes, per template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptLimits {
    pub generate_sql: usize,
    pub explain: usize,
}

impl Default for PromptLimits {
    fn default() -> Self {
        Self {
            generate_sql: 8192,
            explain: 4096,
        }
    }
}

impl PromptLimits {
    pub fn for_kind(&self, kind: PromptKind) -> usize {
        match kind {
            PromptKind::GenerateSql => self.generate_sql,
            PromptKind::ExplainQuery | PromptKind::ExplainPlan => self.explain,
        }
    }
}

/// What to fill into a template.
#[derive(Debug, Clone, Copy)]
pub enum PromptRequest<'a> {
    GenerateSql {
        schema: &'a SchemaSummary,
        question: &'a str,
    },
    ExplainQuery {
        sql: &'a str,
    },
    ExplainPlan {
        sql: &'a str,
    },
}

impl PromptRequest<'_> {
    pub fn kind(&self) -> PromptKind {
        match self {
            PromptRequest::GenerateSql { .. } => PromptKind::GenerateSql,
            PromptRequest::ExplainQuery { .. } => PromptKind::ExplainQuery,
            PromptRequest::ExplainPlan { .. } => PromptKind::ExplainPlan,
        }
    }
}

/// A filled-in template. Holds plain text; JSON escaping happens when it is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    kind: PromptKind,
    text: String,
}

impl Prompt {
    pub fn kind(&self) -> PromptKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Size of the prompt once JSON-encoded into the request body, without the quotes.
    pub fn wire_len(&self) -> usize {
        json_escaped_len(&self.text)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    limits: PromptLimits,
}

impl PromptBuilder {
    pub fn new(limits: PromptLimits) -> Self {
        Self { limits }
    }

    pub fn build(&self, request: PromptRequest<'_>) -> Result<Prompt> {
        let kind = request.kind();
        let text = match request {
            PromptRequest::GenerateSql { schema, question } => format!(
                "You are a PostgreSQL expert. Given this database schema:\n{} \
                 Write ONLY the SQL query for: {}",
                schema.render(),
                question
            ),
            PromptRequest::ExplainQuery { sql } => {
                format!("Explain this PostgreSQL query clearly:\n{}", sql)
            }
            PromptRequest::ExplainPlan { sql } => {
                format!("Explain the execution plan for this PostgreSQL query:\n{}", sql)
            }
        };

        let prompt = Prompt { kind, text };
        let len = prompt.wire_len();
        let limit = self.limits.for_kind(kind);
        if len > limit {
            return Err(ChatboxError::PromptTooLarge { kind, len, limit });
        }

        tracing::debug!(kind = %kind, wire_len = len, limit, "built prompt");
        Ok(prompt)
    }
}

/// Escape `"`, `\` and newline. Every other character passes through unchanged.
pub fn escape(input: &str) -> Cow<'_, str> {
    if !input.contains(['"', '\\', '\n']) {
        return Cow::Borrowed(input);
    }
    let mut out = String::with_capacity(input.len() + 8);
    for c in input.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

/// Inverse of [`escape`]. Unknown escape sequences are kept verbatim.
pub fn unescape(input: &str) -> Cow<'_, str> {
    if !input.contains('\\') {
        return Cow::Borrowed(input);
    }
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    Cow::Owned(out)
}

/// Length of `input` as `serde_json` writes it inside a string literal.
///
/// Quote, backslash and the short control escapes (`\b \t \n \f \r`) take two
/// bytes; every other control character becomes a six-byte `\u00XX`.
fn json_escaped_len(input: &str) -> usize {
    input
        .bytes()
        .map(|b| match b {
            b'"' | b'\\' | b'\x08' | b'\t' | b'\n' | b'\x0c' | b'\r' => 2,
            0x00..=0x1f => 6,
            _ => 1,
        })
        .sum()
}
