use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use crate::chain::{ask, Chain};
use crate::error::Result;
use crate::prompt::{PromptBuilder, PromptKind, PromptRequest};
use crate::transport::GenerationTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplainTarget {
    /// What the statement does.
    Query,
    /// How the planner would execute it.
    Plan,
}

/// Asks the model to explain a SQL statement. Never touches the catalog.
pub struct ExplainChain {
    target: ExplainTarget,
    client: Arc<dyn GenerationTransport>,
    prompts: PromptBuilder,
}

impl ExplainChain {
    pub fn new(
        target: ExplainTarget,
        client: Arc<dyn GenerationTransport>,
        prompts: PromptBuilder,
    ) -> Self {
        Self {
            target,
            client,
            prompts,
        }
    }

    pub fn kind(&self) -> PromptKind {
        match self.target {
            ExplainTarget::Query => PromptKind::ExplainQuery,
            ExplainTarget::Plan => PromptKind::ExplainPlan,
        }
    }
}

#[async_trait]
impl Chain for ExplainChain {
    #[instrument(name = "explain", skip_all, fields(sql_len = input.len()))]
    async fn run(&self, input: String) -> Result<String> {
        tracing::debug!(kind = %self.kind(), "explaining statement");
        let request = match self.target {
            ExplainTarget::Query => PromptRequest::ExplainQuery { sql: &input },
            ExplainTarget::Plan => PromptRequest::ExplainPlan { sql: &input },
        };
        let prompt = self.prompts.build(request)?;

        let explanation = ask(self.client.as_ref(), &prompt).await?;
        Ok(explanation.into_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatboxError;
    use crate::prompt::Prompt;
    use crate::transport::ResponseBody;
    use std::sync::Mutex;

    /// Replies with the prompt it was given, JSON-encoded.
    #[derive(Default)]
    struct EchoTransport {
        seen: Mutex<Vec<PromptKind>>,
    }

    #[async_trait]
    impl GenerationTransport for EchoTransport {
        async fn generate(&self, prompt: &Prompt) -> Result<ResponseBody> {
            self.seen.lock().unwrap().push(prompt.kind());
            let body = serde_json::json!({ "response": prompt.as_str() }).to_string();
            Ok(ResponseBody::from(body.as_bytes()))
        }
    }

    struct DownTransport;

    #[async_trait]
    impl GenerationTransport for DownTransport {
        async fn generate(&self, _prompt: &Prompt) -> Result<ResponseBody> {
            Err(ChatboxError::transport("Couldn't connect to server"))
        }
    }

    #[tokio::test]
    async fn test_explain_query_prompt() {
        let transport = Arc::new(EchoTransport::default());
        let chain = ExplainChain::new(
            ExplainTarget::Query,
            transport.clone(),
            PromptBuilder::default(),
        );

        let answer = chain.run("SELECT * FROM users".to_string()).await.unwrap();
        assert_eq!(answer, "Explain this PostgreSQL query clearly:\nSELECT * FROM users");
        assert_eq!(*transport.seen.lock().unwrap(), vec![PromptKind::ExplainQuery]);
    }

    #[tokio::test]
    async fn test_explain_plan_prompt() {
        let transport = Arc::new(EchoTransport::default());
        let chain = ExplainChain::new(
            ExplainTarget::Plan,
            transport.clone(),
            PromptBuilder::default(),
        );
        assert_eq!(chain.kind(), PromptKind::ExplainPlan);

        let answer = chain.run("SELECT 1".to_string()).await.unwrap();
        assert_eq!(
            answer,
            "Explain the execution plan for this PostgreSQL query:\nSELECT 1"
        );
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let chain = ExplainChain::new(
            ExplainTarget::Query,
            Arc::new(DownTransport),
            PromptBuilder::default(),
        );
        let err = chain.run("SELECT 1".to_string()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Ollama request failed: Couldn't connect to server"
        );
    }
}
