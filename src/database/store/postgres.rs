//! Postgres-backed key-value table.
//!
//! One table holds every item:
//!
//! ```sql
//! CREATE TABLE <table> (pk TEXT NOT NULL, sk TEXT NOT NULL, item JSONB NOT NULL, PRIMARY KEY (pk, sk))
//! CREATE INDEX <index> ON <table> (sk, pk)
//! ```
//!
//! The `(sk, pk)` index serves inverted-index queries. Sort comparisons use the
//! `"C"` collation so ordering is bytewise, matching the in-memory backend.
//! Table and index names come from configuration and are checked against a
//! plain-identifier allowlist before being spliced into SQL.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::info;

use super::{DatabaseError, Item, KeyValueStore, QueryIndex, QueryInput, QueryOutput, SortOrder};
use crate::config::StorageConfig;
use crate::database::keys::Key;

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
    table: String,
}

impl PostgresStore {
    /// Connect, then create the table and inverted index when missing.
    pub async fn connect(config: &StorageConfig) -> Result<Self, DatabaseError> {
        let url = config
            .database_url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;
        let table = quote_identifier(&config.table_name)?;
        let index = quote_identifier(&config.index_name)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {} (pk TEXT NOT NULL, sk TEXT NOT NULL, item JSONB NOT NULL, PRIMARY KEY (pk, sk))",
            table
        ))
        .execute(&pool)
        .await?;
        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS {} ON {} (sk, pk)",
            index, table
        ))
        .execute(&pool)
        .await?;

        info!("Connected key-value table {}", config.table_name);
        Ok(Self { pool, table })
    }

    fn insert_sql(&self) -> String {
        format!(
            "INSERT INTO {} (pk, sk, item) VALUES ($1, $2, $3) ON CONFLICT (pk, sk) DO NOTHING",
            self.table
        )
    }

    fn query_sql(&self, input: &QueryInput) -> String {
        let (partition_col, sort_col) = match input.index {
            QueryIndex::Primary => ("pk", "sk"),
            QueryIndex::Inverted => ("sk", "pk"),
        };
        let (cmp, dir) = match input.order {
            SortOrder::Ascending => (">", "ASC"),
            SortOrder::Descending => ("<", "DESC"),
        };
        format!(
            "SELECT pk, sk, item FROM {table} \
             WHERE {p} = $1 AND starts_with({s}, $2) \
             AND ($3::text IS NULL OR {s} COLLATE \"C\" {cmp} $3::text COLLATE \"C\") \
             ORDER BY {s} COLLATE \"C\" {dir} LIMIT $4",
            table = self.table,
            p = partition_col,
            s = sort_col,
            cmp = cmp,
            dir = dir,
        )
    }
}

#[async_trait]
impl KeyValueStore for PostgresStore {
    async fn get(&self, key: &Key) -> Result<Option<Item>, DatabaseError> {
        let row = sqlx::query(&format!(
            "SELECT pk, sk, item FROM {} WHERE pk = $1 AND sk = $2",
            self.table
        ))
        .bind(&key.pk)
        .bind(&key.sk)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| row_to_item(&row).map(|(_, item)| item)).transpose()
    }

    async fn put_if_absent(&self, key: &Key, item: Item) -> Result<(), DatabaseError> {
        let result = sqlx::query(&self.insert_sql())
            .bind(&key.pk)
            .bind(&key.sk)
            .bind(Value::Object(item))
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::ConditionalCheckFailed {
                pk: key.pk.clone(),
                sk: key.sk.clone(),
            });
        }
        Ok(())
    }

    async fn transact_put_if_absent(&self, writes: Vec<(Key, Item)>) -> Result<(), DatabaseError> {
        let sql = self.insert_sql();
        let mut tx = self.pool.begin().await?;

        for (key, item) in writes {
            let result = sqlx::query(&sql)
                .bind(&key.pk)
                .bind(&key.sk)
                .bind(Value::Object(item))
                .execute(&mut *tx)
                .await?;
            if result.rows_affected() == 0 {
                // Dropping the transaction rolls back the earlier inserts.
                return Err(DatabaseError::ConditionalCheckFailed { pk: key.pk, sk: key.sk });
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn query(&self, input: QueryInput) -> Result<QueryOutput, DatabaseError> {
        let start = input
            .exclusive_start_key
            .as_ref()
            .map(|key| input.sort_value(key).to_string());

        let rows = sqlx::query(&self.query_sql(&input))
            .bind(&input.partition)
            .bind(&input.sort_prefix)
            .bind(start)
            .bind(input.fetch_limit())
            .fetch_all(&self.pool)
            .await?;

        let rows = rows.iter().map(row_to_item).collect::<Result<Vec<_>, _>>()?;
        Ok(QueryOutput::from_rows(rows, input.limit))
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

fn row_to_item(row: &PgRow) -> Result<(Key, Item), DatabaseError> {
    let key = Key::new(row.try_get::<String, _>("pk")?, row.try_get::<String, _>("sk")?);
    let value = row.try_get::<Value, _>("item")?;
    match serde_json::from_value::<Item>(value) {
        Ok(item) => Ok((key, item)),
        Err(source) => Err(DatabaseError::CorruptItem {
            pk: key.pk,
            sk: key.sk,
            source,
        }),
    }
}

/// Quote a configured table/index name after checking it is a plain identifier.
fn quote_identifier(name: &str) -> Result<String, DatabaseError> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false);
    if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') || name.len() > 63 {
        return Err(DatabaseError::InvalidIdentifier(name.to_string()));
    }
    Ok(format!("\"{}\"", name))
}
