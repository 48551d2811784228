use async_trait::async_trait;

use crate::error::Result;
use crate::extract::{extract, GeneratedAnswer};
use crate::prompt::Prompt;
use crate::transport::GenerationTransport;

/// One question in, one answer out.
#[async_trait]
pub trait Chain: Send + Sync {
    async fn run(&self, input: String) -> Result<String>;
}

/// Send a built prompt and pull the answer out of the completed body.
pub(crate) async fn ask(
    transport: &dyn GenerationTransport,
    prompt: &Prompt,
) -> Result<GeneratedAnswer> {
    let body = transport.generate(prompt).await?;
    let answer = extract(&body);
    if answer.is_sentinel() {
        tracing::warn!(kind = %prompt.kind(), "generation service returned no response text");
    }
    Ok(answer)
}
