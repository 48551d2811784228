//! Ask a local LLM to write or explain PostgreSQL, using the live schema as context.
//!
//! Pipeline: schema collection (SQL generation only), prompt building,
//! one non-streaming call to the generation service, answer extraction.

pub mod chain;
pub mod chatbox;
pub mod config;
pub mod error;
pub mod explain_chain;
pub mod extract;
pub mod logging;
pub mod prompt;
pub mod schema;
pub mod text_to_sql_chain;
pub mod transport;

pub use chain::Chain;
pub use chatbox::Chatbox;
pub use config::ChatboxConfig;
pub use error::{ChatboxError, Result};
pub use extract::{extract, GeneratedAnswer, NO_RESPONSE};
pub use prompt::{
    escape, unescape, Prompt, PromptBuilder, PromptKind, PromptLimits, PromptRequest,
};
pub use schema::{collect_schema, CatalogStore, PgCatalog, SchemaSummary, TableDescriptor};
pub use transport::{GenerationTransport, OllamaTransport, ResponseBody, ResponseBuffer};
