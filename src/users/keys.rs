use crate::{
    common::key::{Key, Keys},
    store::{Item, memory},
};

use aws_sdk_dynamodb::types::AttributeValue;
use uuid::Uuid;

/// Table holding every entity of the service.
pub const TABLE_NAME: &str = "BlogContent";
/// Index used to list users.
pub const INDEX_NAME: &str = "GSI1";

/// Table partition key attribute.
pub const PARTITION_KEY: &str = "PK";
/// Table sort key attribute.
pub const SORT_KEY: &str = "SK";
/// Index partition key attribute.
pub const INDEX_PARTITION_KEY: &str = "GSI1PK";
/// Index sort key attribute.
pub const INDEX_SORT_KEY: &str = "GSI1SK";

/// Every attribute that only exists to place the item in the table and index.
pub const KEY_ATTRIBUTES: [&str; 4] = [PARTITION_KEY, SORT_KEY, INDEX_PARTITION_KEY, INDEX_SORT_KEY];

const USER_PREFIX: &str = "USER#";
const PROFILE: &str = "PROFILE";
const USER_COLLECTION: &str = "USER";

/// `USER#<id>`, shared by the table partition key and the index sort key.
pub fn user_key(id: Uuid) -> String {
    format!("{USER_PREFIX}{}", id.hyphenated())
}

/// Primary key of the user's profile item.
pub fn primary_key(id: Uuid) -> Keys<String> {
    Keys {
        partition_key: Key::new(PARTITION_KEY, user_key(id)),
        sort_key: Some(Key::new(SORT_KEY, PROFILE.to_string())),
    }
}

/// Partition of the index that holds every user.
pub fn collection_key() -> Key<String> {
    Key::new(INDEX_PARTITION_KEY, USER_COLLECTION.to_string())
}

/// The four key attributes of the user's profile item.
pub fn key_attributes(id: Uuid) -> Item {
    let user_key = user_key(id);
    [
        (PARTITION_KEY, user_key.clone()),
        (SORT_KEY, PROFILE.to_string()),
        (INDEX_PARTITION_KEY, USER_COLLECTION.to_string()),
        (INDEX_SORT_KEY, user_key),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), AttributeValue::S(value)))
    .collect()
}

/// In-memory table with this layout's primary key and index.
pub fn memory_store() -> memory::MemoryStore {
    let table_schema = memory::KeySchema::new(PARTITION_KEY, SORT_KEY);
    let index_schema = memory::KeySchema::new(INDEX_PARTITION_KEY, INDEX_SORT_KEY);
    memory::MemoryStore::new(TABLE_NAME, table_schema)
        .with_index(INDEX_NAME, index_schema)
}
