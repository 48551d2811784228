use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use crate::chain::Chain;
use crate::config::{ChatboxConfig, DATABASE_URL_ENV};
use crate::error::{ChatboxError, Result};
use crate::explain_chain::{ExplainChain, ExplainTarget};
use crate::prompt::{PromptBuilder, PromptLimits};
use crate::schema::{CatalogStore, PgCatalog};
use crate::text_to_sql_chain::TextToSqlChain;
use crate::transport::{GenerationTransport, OllamaTransport};

/// The three caller-facing operations. Each call runs with its own buffers;
/// a `Chatbox` can be shared across tasks.
pub struct Chatbox {
    sql: Option<TextToSqlChain>,
    explain: ExplainChain,
    plan: ExplainChain,
}

impl Chatbox {
    pub fn new(
        catalog: Option<Arc<dyn CatalogStore>>,
        transport: Arc<dyn GenerationTransport>,
        limits: PromptLimits,
    ) -> Self {
        let prompts = PromptBuilder::new(limits);
        Self {
            sql: catalog.map(|catalog| {
                TextToSqlChain::new(catalog, transport.clone(), prompts.clone())
            }),
            explain: ExplainChain::new(ExplainTarget::Query, transport.clone(), prompts.clone()),
            plan: ExplainChain::new(ExplainTarget::Plan, transport, prompts),
        }
    }

    /// Build from config. The database pool connects lazily, so the explain
    /// operations work even when the database is unreachable.
    pub fn from_config(config: &ChatboxConfig) -> Result<Self> {
        let transport: Arc<dyn GenerationTransport> = Arc::new(OllamaTransport::new(config)?);

        let catalog = match &config.database_url {
            Some(url) => {
                let pool = PgPoolOptions::new()
                    .max_connections(4)
                    .connect_lazy(url)
                    .map_err(|e| {
                        ChatboxError::Config(format!("invalid {}: {}", DATABASE_URL_ENV, e))
                    })?;
                Some(Arc::new(PgCatalog::new(pool)) as Arc<dyn CatalogStore>)
            }
            None => None,
        };

        tracing::info!(
            endpoint = %config.endpoint,
            model = %config.model,
            timeout_secs = config.request_timeout.as_secs(),
            catalog = catalog.is_some(),
            "chatbox ready"
        );

        Ok(Self::new(catalog, transport, config.limits))
    }

    pub async fn generate_sql(&self, question: &str) -> Result<String> {
        let chain = self.sql.as_ref().ok_or_else(|| {
            ChatboxError::Config(format!("{} must be set to generate SQL", DATABASE_URL_ENV))
        })?;
        chain.run(question.to_string()).await
    }

    pub async fn explain_query(&self, sql: &str) -> Result<String> {
        self.explain.run(sql.to_string()).await
    }

    pub async fn explain_plan(&self, sql: &str) -> Result<String> {
        self.plan.run(sql.to_string()).await
    }
}
