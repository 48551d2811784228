//! Live schema introspection for the text-to-SQL prompt.

use std::fmt;

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::Connection;

use crate::error::Result;

const TABLE_COLUMNS_QUERY: &str = "SELECT table_name::text, \
     array_agg(column_name::text ORDER BY ordinal_position) \
     FROM information_schema.columns \
     WHERE table_schema NOT IN ('pg_catalog', 'information_schema') \
     GROUP BY table_name \
     ORDER BY table_name";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    pub name: String,
    pub columns: Vec<String>,
}

impl TableDescriptor {
    pub fn new(name: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            name: name.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl fmt::Display for TableDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.columns.join(", "))
    }
}

/// Tables of the target database, sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaSummary {
    tables: Vec<TableDescriptor>,
}

impl SchemaSummary {
    pub fn new(mut tables: Vec<TableDescriptor>) -> Self {
        tables.sort_by(|a, b| a.name.cmp(&b.name));
        Self { tables }
    }

    pub fn tables(&self) -> &[TableDescriptor] {
        &self.tables
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// One `table(col, ...)` line per table, each newline-terminated.
    /// Empty when there are no tables.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for table in &self.tables {
            out.push_str(&table.to_string());
            out.push('\n');
        }
        out
    }
}

/// Source of table and column names.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn fetch_tables(&self) -> Result<Vec<TableDescriptor>>;
}

pub struct PgCatalog {
    db: PgPool,
}

impl PgCatalog {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CatalogStore for PgCatalog {
    async fn fetch_tables(&self) -> Result<Vec<TableDescriptor>> {
        // The pooled connection and the transaction are both returned/rolled back on drop.
        let mut conn = self.db.acquire().await?;
        let mut tx = conn.begin().await?;

        sqlx::query("SET TRANSACTION READ ONLY")
            .execute(&mut *tx)
            .await?;

        let rows: Vec<(String, Vec<String>)> = sqlx::query_as(TABLE_COLUMNS_QUERY)
            .fetch_all(&mut *tx)
            .await?;

        tx.rollback().await?;

        Ok(rows
            .into_iter()
            .map(|(name, columns)| TableDescriptor { name, columns })
            .collect())
    }
}

pub async fn collect_schema(catalog: &dyn CatalogStore) -> Result<SchemaSummary> {
    let tables = catalog.fetch_tables().await?;
    tracing::debug!(tables = tables.len(), "collected schema");
    Ok(SchemaSummary::new(tables))
}
