//! In-memory key-value table.
//!
//! Items sit in a `BTreeMap` ordered by `(pk, sk)` behind a `tokio` `RwLock`.
//! Not durable; state is lost when the process exits. Writes hold the lock for
//! their whole duration, which is what makes the multi-item write atomic.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{DatabaseError, Item, KeyValueStore, QueryIndex, QueryInput, QueryOutput, SortOrder};
use crate::database::keys::Key;

#[derive(Clone, Default)]
pub struct MemoryStore {
    items: Arc<RwLock<BTreeMap<Key, Item>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &Key) -> Result<Option<Item>, DatabaseError> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn put_if_absent(&self, key: &Key, item: Item) -> Result<(), DatabaseError> {
        let mut items = self.items.write().await;
        if items.contains_key(key) {
            return Err(DatabaseError::ConditionalCheckFailed {
                pk: key.pk.clone(),
                sk: key.sk.clone(),
            });
        }
        items.insert(key.clone(), item);
        Ok(())
    }

    async fn transact_put_if_absent(&self, writes: Vec<(Key, Item)>) -> Result<(), DatabaseError> {
        let mut items = self.items.write().await;
        for (index, (key, _)) in writes.iter().enumerate() {
            let repeated = writes[..index].iter().any(|(earlier, _)| earlier == key);
            if repeated || items.contains_key(key) {
                return Err(DatabaseError::ConditionalCheckFailed {
                    pk: key.pk.clone(),
                    sk: key.sk.clone(),
                });
            }
        }
        items.extend(writes);
        Ok(())
    }

    async fn query(&self, input: QueryInput) -> Result<QueryOutput, DatabaseError> {
        let items = self.items.read().await;

        let mut rows: Vec<(Key, Item)> = match input.index {
            QueryIndex::Primary => {
                // Keys are ordered by pk first, so a partition is one contiguous run.
                let from = Key::new(input.partition.clone(), input.sort_prefix.clone());
                items
                    .range(from..)
                    .take_while(|(key, _)| key.pk == input.partition)
                    .filter(|(key, _)| input.matches(key))
                    .map(|(key, item)| (key.clone(), item.clone()))
                    .collect()
            }
            QueryIndex::Inverted => {
                let mut rows: Vec<(Key, Item)> = items
                    .iter()
                    .filter(|(key, _)| input.matches(key))
                    .map(|(key, item)| (key.clone(), item.clone()))
                    .collect();
                rows.sort_by(|(a, _), (b, _)| a.pk.cmp(&b.pk));
                rows
            }
        };

        if input.order == SortOrder::Descending {
            rows.reverse();
        }
        if let Some(fetch) = input.fetch_limit() {
            rows.truncate(fetch as usize);
        }

        Ok(QueryOutput::from_rows(rows, input.limit))
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
