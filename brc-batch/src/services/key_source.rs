//! Key source port and its two implementations
//!
//! A key source supplies the ordered sequence of remote object keys for a
//! run. Keys come back trimmed with blank entries dropped; duplicate
//! removal is the pipeline's job. A source that cannot be read at all is
//! `Error::SourceUnavailable`, which aborts the run before any download.

use crate::types::ObjectKey;
use async_trait::async_trait;
use brc_common::table::TableDocument;
use brc_common::{Error, Result};
use sqlx::SqlitePool;
use std::path::PathBuf;

/// Ordered provider of remote object keys
#[async_trait]
pub trait KeySource: Send + Sync {
    async fn list_keys(&self) -> Result<Vec<ObjectKey>>;
}

/// Second column holds the key; the first is the row index
const KEY_COLUMN: usize = 1;

/// Keys read from the input report table (header row skipped)
pub struct TableKeySource {
    path: PathBuf,
}

impl TableKeySource {
    pub fn new(path: impl Into<PathBuf>) -> TableKeySource {
        TableKeySource { path: path.into() }
    }
}

#[async_trait]
impl KeySource for TableKeySource {
    async fn list_keys(&self) -> Result<Vec<ObjectKey>> {
        let doc = TableDocument::read_csv(&self.path)?;
        let keys = doc
            .rows
            .iter()
            .filter_map(|row| ObjectKey::new(&row.cell(KEY_COLUMN).render()))
            .collect();
        Ok(keys)
    }
}

/// Keys produced by a configured SQL statement; the first column of each
/// returned row is the key
pub struct QueryKeySource {
    pool: SqlitePool,
    query: String,
}

impl QueryKeySource {
    pub fn new(pool: SqlitePool, query: impl Into<String>) -> QueryKeySource {
        QueryKeySource {
            pool,
            query: query.into(),
        }
    }

    /// Connect to `database_url` and build a source over `query`
    pub async fn connect(database_url: &str, query: impl Into<String>) -> Result<QueryKeySource> {
        let pool = SqlitePool::connect(database_url)
            .await
            .map_err(|e| Error::SourceUnavailable(format!("{}: {}", database_url, e)))?;
        Ok(QueryKeySource::new(pool, query))
    }
}

#[async_trait]
impl KeySource for QueryKeySource {
    async fn list_keys(&self) -> Result<Vec<ObjectKey>> {
        let rows: Vec<(String,)> = sqlx::query_as(&self.query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::SourceUnavailable(e.to_string()))?;

        Ok(rows
            .into_iter()
            .filter_map(|(key,)| ObjectKey::new(&key))
            .collect())
    }
}
