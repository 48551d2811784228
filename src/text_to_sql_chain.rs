use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use crate::chain::{ask, Chain};
use crate::error::Result;
use crate::prompt::{PromptBuilder, PromptRequest};
use crate::schema::{collect_schema, CatalogStore};
use crate::transport::GenerationTransport;

pub struct TextToSqlChain {
    catalog: Arc<dyn CatalogStore>,
    client: Arc<dyn GenerationTransport>,
    prompts: PromptBuilder,
}

impl TextToSqlChain {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        client: Arc<dyn GenerationTransport>,
        prompts: PromptBuilder,
    ) -> Self {
        Self {
            catalog,
            client,
            prompts,
        }
    }
}

#[async_trait]
impl Chain for TextToSqlChain {
    #[instrument(name = "generate_sql", skip_all, fields(question_len = input.len()))]
    async fn run(&self, input: String) -> Result<String> {
        let schema = collect_schema(self.catalog.as_ref()).await?;
        if schema.is_empty() {
            tracing::info!("database has no user tables, asking without schema context");
        }

        let prompt = self.prompts.build(PromptRequest::GenerateSql {
            schema: &schema,
            question: &input,
        })?;

        let sql_query = ask(self.client.as_ref(), &prompt).await?;
        tracing::debug!(answer_len = sql_query.as_str().len(), "sql generated");

        Ok(sql_query.into_string())
    }
}
