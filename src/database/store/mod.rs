//! Key-value table abstraction.
//!
//! The handlers only need a narrow slice of a managed table service: point
//! reads, create-if-absent writes, all-or-nothing multi-item writes and
//! prefix queries with an exclusive start key. Backends implement
//! [`KeyValueStore`]; [`memory::MemoryStore`] for development and tests,
//! [`postgres::PostgresStore`] for durable deployments.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::database::keys::Key;

pub mod memory;
pub mod postgres;

/// Attribute map of a stored item. Key attributes are kept out of it.
pub type Item = Map<String, Value>;

/// Errors surfaced by a store backend.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A create-if-absent condition failed (item already present).
    #[error("Conditional check failed for {pk} / {sk}")]
    ConditionalCheckFailed { pk: String, sk: String },

    /// The gateway's translation of a conditional failure.
    #[error("Duplicate item: {0}")]
    DuplicateItem(String),

    #[error("Corrupt item {pk} / {sk}: {source}")]
    CorruptItem {
        pk: String,
        sk: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Which key a query runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryIndex {
    /// Partition on `pk`, sort on `sk`.
    #[default]
    Primary,
    /// Partition on `sk`, sort on `pk`.
    Inverted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// A prefix query against one partition.
#[derive(Debug, Clone, Default)]
pub struct QueryInput {
    pub index: QueryIndex,
    pub partition: String,
    pub sort_prefix: String,
    pub limit: Option<u32>,
    pub exclusive_start_key: Option<Key>,
    pub order: SortOrder,
}

impl QueryInput {
    /// Value of the index's sort attribute for a given key.
    pub fn sort_value<'k>(&self, key: &'k Key) -> &'k str {
        match self.index {
            QueryIndex::Primary => &key.sk,
            QueryIndex::Inverted => &key.pk,
        }
    }

    fn partition_value<'k>(&self, key: &'k Key) -> &'k str {
        match self.index {
            QueryIndex::Primary => &key.pk,
            QueryIndex::Inverted => &key.sk,
        }
    }

    /// Whether `key` belongs to the page window described by this query,
    /// ignoring the limit.
    pub fn matches(&self, key: &Key) -> bool {
        if self.partition_value(key) != self.partition {
            return false;
        }
        let sort = self.sort_value(key);
        if !sort.starts_with(&self.sort_prefix) {
            return false;
        }
        match &self.exclusive_start_key {
            None => true,
            Some(start) => {
                let start = self.sort_value(start);
                match self.order {
                    SortOrder::Ascending => sort > start,
                    SortOrder::Descending => sort < start,
                }
            }
        }
    }

    /// Rows to request from a backend so that a continuation key can be
    /// emitted only when another item actually exists.
    pub fn fetch_limit(&self) -> Option<i64> {
        self.limit.map(|limit| i64::from(limit) + 1)
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryOutput {
    pub items: Vec<(Key, Item)>,
    pub last_evaluated_key: Option<Key>,
}

impl QueryOutput {
    /// Cut an over-fetched, ordered row set down to one page.
    pub fn from_rows(mut rows: Vec<(Key, Item)>, limit: Option<u32>) -> Self {
        let last_evaluated_key = match limit {
            Some(limit) if rows.len() > limit as usize => {
                rows.truncate(limit as usize);
                rows.last().map(|(key, _)| key.clone())
            }
            _ => None,
        };
        Self {
            items: rows,
            last_evaluated_key,
        }
    }
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Point read. `Ok(None)` when nothing is stored under `key`.
    async fn get(&self, key: &Key) -> Result<Option<Item>, DatabaseError>;

    /// Write `item` only if `key` is unused. Fails with
    /// [`DatabaseError::ConditionalCheckFailed`] otherwise.
    async fn put_if_absent(&self, key: &Key, item: Item) -> Result<(), DatabaseError>;

    /// Create every item, or none of them if any key is already in use.
    async fn transact_put_if_absent(&self, writes: Vec<(Key, Item)>) -> Result<(), DatabaseError>;

    async fn query(&self, input: QueryInput) -> Result<QueryOutput, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;

    fn backend_name(&self) -> &'static str;
}
