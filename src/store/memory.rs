use crate::{
    common::{
        condition::{Condition, ConditionMap, KeyCondition, LogicalOperator},
        key::Keys,
    },
    read,
    store::{Item, Store, StoreError},
    write,
};

use async_trait::async_trait;
use std::collections;
use tokio::sync::RwLock;

const KEY_SCHEMA_MISMATCH: &str = "the provided key element does not match the schema";

/// Names of the partition and sort key attributes of a table or index.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeySchema {
    /// Partition key attribute name.
    pub partition_key: String,
    /// Sort key attribute name.
    pub sort_key: String,
}

impl KeySchema {
    /// Builds a composite key schema.
    pub fn new(partition_key: impl Into<String>, sort_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            sort_key: sort_key.into(),
        }
    }
}

/// Single-table store held in process memory.
///
/// Items are keyed by their string partition and sort key. Secondary indexes are sparse: an item
/// appears in an index only when it carries both of the index's key attributes. Reads are always
/// consistent and conditions are evaluated under the same lock as the write they guard.
#[derive(Debug)]
pub struct MemoryStore {
    table_name: String,
    key_schema: KeySchema,
    indexes: collections::HashMap<String, KeySchema>,
    items: RwLock<collections::BTreeMap<(String, String), Item>>,
}

impl MemoryStore {
    /// Creates an empty table with the given primary key schema.
    pub fn new(table_name: impl Into<String>, key_schema: KeySchema) -> Self {
        Self {
            table_name: table_name.into(),
            key_schema,
            indexes: collections::HashMap::new(),
            items: RwLock::new(collections::BTreeMap::new()),
        }
    }

    /// Registers a global secondary index.
    pub fn with_index(mut self, index_name: impl Into<String>, key_schema: KeySchema) -> Self {
        self.indexes.insert(index_name.into(), key_schema);
        self
    }

    /// Number of stored items.
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    /// Whether the table holds no items.
    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    /// Writes an item without any condition, bypassing the typed operations.
    pub async fn insert_raw(&self, item: Item) -> Result<(), StoreError> {
        let key = self.item_key(&item)?;
        self.items.write().await.insert(key, item);
        Ok(())
    }

    fn check_table(&self, table_name: &str) -> Result<(), StoreError> {
        if table_name == self.table_name {
            Ok(())
        } else {
            Err(StoreError::Service(format!(
                "requested resource not found: table `{table_name}`"
            )))
        }
    }

    fn primary_key(&self, keys: Keys<String>) -> Result<(String, String), StoreError> {
        let schema_mismatch = || StoreError::Service(KEY_SCHEMA_MISMATCH.to_string());
        let sort_key = keys.sort_key.ok_or_else(schema_mismatch)?;
        if keys.partition_key.name != self.key_schema.partition_key
            || sort_key.name != self.key_schema.sort_key
        {
            return Err(schema_mismatch());
        }
        Ok((keys.partition_key.value, sort_key.value))
    }

    fn item_key(&self, item: &Item) -> Result<(String, String), StoreError> {
        let partition_key = key_attribute(item, &self.key_schema.partition_key)?;
        let sort_key = key_attribute(item, &self.key_schema.sort_key)?;
        Ok((partition_key.to_string(), sort_key.to_string()))
    }
}

fn key_attribute<'a>(item: &'a Item, name: &str) -> Result<&'a str, StoreError> {
    string_attribute(item, name).ok_or_else(|| StoreError::InvalidAttribute {
        name: name.to_string(),
        reason: "key attribute must be present and of string type".to_string(),
    })
}

fn string_attribute<'a>(item: &'a Item, name: &str) -> Option<&'a str> {
    item.get(name)
        .and_then(|value| value.as_s().ok())
        .map(String::as_str)
}

fn satisfies(item: Option<&Item>, key_condition: &KeyCondition<String>) -> bool {
    let name = key_condition.name.as_str();
    match &key_condition.condition {
        Condition::BeginsWith(prefix) => item
            .and_then(|item| string_attribute(item, name))
            .is_some_and(|value| value.starts_with(prefix.as_str())),
        Condition::Equals(expected) => {
            item.and_then(|item| string_attribute(item, name)) == Some(expected.as_str())
        }
        Condition::Exists => item.is_some_and(|item| item.contains_key(name)),
        Condition::NotExists => !item.is_some_and(|item| item.contains_key(name)),
    }
}

fn combine(operator: &LogicalOperator, mut results: impl Iterator<Item = bool>) -> bool {
    match operator {
        LogicalOperator::And => results.all(|result| result),
        LogicalOperator::Or => results.any(|result| result),
    }
}

/// Evaluates a condition tree against the current item, `None` when no item is stored.
fn evaluate(condition: &ConditionMap<String>, item: Option<&Item>) -> bool {
    match condition {
        ConditionMap::Leaves(operator, leaves) => combine(
            operator,
            leaves.iter().map(|leaf| satisfies(item, leaf)),
        ),
        ConditionMap::Group(operator, children) => combine(
            operator,
            children.iter().map(|child| evaluate(child, item)),
        ),
    }
}

fn check_condition(
    condition: Option<&ConditionMap<String>>,
    item: Option<&Item>,
) -> Result<(), StoreError> {
    match condition {
        Some(condition) if !evaluate(condition, item) => Err(StoreError::ConditionFailed),
        _ => Ok(()),
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_item(
        &self,
        get_item: read::get_item::GetItem<String>,
    ) -> Result<Option<Item>, StoreError> {
        self.check_table(&get_item.single_read_args.table_name)?;
        let key = self.primary_key(get_item.keys)?;
        Ok(self.items.read().await.get(&key).cloned())
    }

    async fn put_item(&self, put_item: write::put_item::PutItem<String>) -> Result<(), StoreError> {
        self.check_table(&put_item.write_args.table_name)?;
        let key = self.item_key(&put_item.item)?;
        let mut items = self.items.write().await;
        check_condition(put_item.write_args.condition.as_ref(), items.get(&key))?;
        items.insert(key, put_item.item);
        Ok(())
    }

    async fn delete_item(
        &self,
        delete_item: write::delete_item::DeleteItem<String>,
    ) -> Result<(), StoreError> {
        self.check_table(&delete_item.write_args.table_name)?;
        let key = self.primary_key(delete_item.keys)?;
        let mut items = self.items.write().await;
        check_condition(delete_item.write_args.condition.as_ref(), items.get(&key))?;
        items.remove(&key);
        Ok(())
    }

    // `limit` only sizes pages and every page is returned, so it does not change the result.
    async fn query(&self, query: read::query::Query<String>) -> Result<Vec<Item>, StoreError> {
        let read_args = query.multiple_read_args;
        self.check_table(&read_args.table_name)?;
        let key_schema = match &read_args.index_name {
            Some(index_name) => self.indexes.get(index_name).ok_or_else(|| {
                StoreError::Service(format!(
                    "the table does not have the specified index: `{index_name}`"
                ))
            })?,
            None => &self.key_schema,
        };
        if query.partition_key.name != key_schema.partition_key {
            return Err(StoreError::Service(KEY_SCHEMA_MISMATCH.to_string()));
        }
        if let Some(sort_key_condition) = &query.sort_key_condition {
            if sort_key_condition.name != key_schema.sort_key {
                return Err(StoreError::Service(KEY_SCHEMA_MISMATCH.to_string()));
            }
        }

        let items = self.items.read().await;
        let mut matched: Vec<(&str, &Item)> = items
            .values()
            .filter(|item| {
                string_attribute(item, &key_schema.partition_key)
                    == Some(query.partition_key.value.as_str())
            })
            .filter_map(|item| {
                string_attribute(item, &key_schema.sort_key).map(|sort_key| (sort_key, item))
            })
            .filter(|(_, item)| {
                query
                    .sort_key_condition
                    .as_ref()
                    .is_none_or(|condition| satisfies(Some(*item), condition))
            })
            .filter(|(_, item)| {
                read_args
                    .condition
                    .as_ref()
                    .is_none_or(|condition| evaluate(condition, Some(*item)))
            })
            .collect();
        matched.sort_by(|(left, _), (right, _)| left.cmp(right));
        if query.scan_index_forward == Some(false) {
            matched.reverse();
        }
        Ok(matched.into_iter().map(|(_, item)| item.clone()).collect())
    }
}
