use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::database::keys::{member_partition, ChildKind, Key, Parent};
use crate::database::store::{
    DatabaseError, Item, KeyValueStore, QueryIndex, QueryInput, SortOrder,
};

/// Which slice of a listing to read.
#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    /// `None` reads the whole listing.
    pub limit: Option<u32>,
    pub start_key: Option<Key>,
    pub order: SortOrder,
}

impl PageRequest {
    pub fn new(limit: u32, start_key: Option<Key>) -> Self {
        Self {
            limit: Some(limit),
            start_key,
            order: SortOrder::Ascending,
        }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn descending(mut self) -> Self {
        self.order = SortOrder::Descending;
        self
    }
}

/// One page of a listing. `next` is absent on the last page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<Key>,
}

/// Translates domain reads and writes into key-value operations.
///
/// Items are written with all their attributes; the key attributes live only
/// in the store's key, so a read gives back exactly what was written.
#[derive(Clone)]
pub struct StorageService {
    store: Arc<dyn KeyValueStore>,
}

impl StorageService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Create `item` under `key` unless something already lives there.
    pub async fn insert<T: Serialize>(&self, key: Key, item: T) -> Result<T, DatabaseError> {
        let attributes = to_item(&item)?;
        match self.store.put_if_absent(&key, attributes).await {
            Ok(()) => Ok(item),
            Err(err) => Err(remap_conflict(err)),
        }
    }

    /// Point lookup. Absence is not an error at this layer.
    pub async fn get_one<T: DeserializeOwned>(&self, key: &Key) -> Result<Option<T>, DatabaseError> {
        self.store
            .get(key)
            .await?
            .map(|item| from_item(key, item))
            .transpose()
    }

    /// Children of `parent` whose sort key starts with `sort_prefix`.
    pub async fn list_by_parent<T: DeserializeOwned>(
        &self,
        parent: &Parent,
        sort_prefix: &str,
        page: PageRequest,
    ) -> Result<Page<T>, DatabaseError> {
        self.query(QueryInput {
            index: QueryIndex::Primary,
            partition: parent.as_str().to_string(),
            sort_prefix: sort_prefix.to_string(),
            limit: page.limit,
            exclusive_start_key: page.start_key,
            order: page.order,
        })
        .await
    }

    /// Membership records of `user_id` whose partition starts with
    /// `parent_prefix`, read through the inverted index.
    pub async fn list_by_member<T: DeserializeOwned>(
        &self,
        user_id: &str,
        parent_prefix: &str,
        page: PageRequest,
    ) -> Result<Page<T>, DatabaseError> {
        self.query(QueryInput {
            index: QueryIndex::Inverted,
            partition: member_partition(user_id),
            sort_prefix: parent_prefix.to_string(),
            limit: page.limit,
            exclusive_start_key: page.start_key,
            order: page.order,
        })
        .await
    }

    /// Write an entity and its creator's membership in one all-or-nothing
    /// operation.
    pub async fn create_with_membership<E: Serialize, M: Serialize>(
        &self,
        entity: (Key, &E),
        membership: (Key, &M),
    ) -> Result<(), DatabaseError> {
        let writes = vec![
            (entity.0, to_item(entity.1)?),
            (membership.0, to_item(membership.1)?),
        ];
        self.store
            .transact_put_if_absent(writes)
            .await
            .map_err(remap_conflict)
    }

    /// Whether `user_id` has a membership record under `parent`.
    pub async fn check_membership(&self, parent: &Parent, user_id: &str) -> Result<bool, DatabaseError> {
        let key = parent.child(ChildKind::Member.sort_key(user_id));
        Ok(self.store.get(&key).await?.is_some())
    }

    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        self.store.health_check().await
    }

    async fn query<T: DeserializeOwned>(&self, input: QueryInput) -> Result<Page<T>, DatabaseError> {
        let output = self.store.query(input).await?;
        let items = output
            .items
            .into_iter()
            .map(|(key, item)| from_item(&key, item))
            .collect::<Result<Vec<T>, _>>()?;
        Ok(Page {
            items,
            next: output.last_evaluated_key,
        })
    }
}

fn remap_conflict(err: DatabaseError) -> DatabaseError {
    match err {
        DatabaseError::ConditionalCheckFailed { pk, sk } => {
            DatabaseError::DuplicateItem(format!("{} already exists in {}", sk, pk))
        }
        other => other,
    }
}

fn to_item<T: Serialize>(value: &T) -> Result<Item, DatabaseError> {
    Ok(serde_json::from_value(serde_json::to_value(value)?)?)
}

fn from_item<T: DeserializeOwned>(key: &Key, item: Item) -> Result<T, DatabaseError> {
    serde_json::from_value(Value::Object(item)).map_err(|source| DatabaseError::CorruptItem {
        pk: key.pk.clone(),
        sk: key.sk.clone(),
        source,
    })
}
