use aws_sdk_dynamodb::types;
use serde::Serialize;
use serde_dynamo::{Error, Result, to_attribute_value};
use std::collections;

/// One component of a primary key.
///
/// ```rust
/// use dynamodb_users::common::key;
///
/// let key = key::Key {
///     name: "PK".to_string(),
///     value: "USER#1".to_string(),
/// };
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Key<T> {
    /// The attribute name of the key.
    pub name: String,
    /// The value of the key.
    pub value: T,
}

impl<T> Key<T> {
    /// Builds a key component from its attribute name and value.
    pub fn new(name: impl Into<String>, value: T) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Primary key: a partition key and, for composite tables, a sort key.
///
/// ```rust
/// use dynamodb_users::common::key;
///
/// let keys = key::Keys {
///     partition_key: key::Key::new("PK", "USER#1".to_string()),
///     sort_key: Some(key::Key::new("SK", "PROFILE".to_string())),
/// };
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Keys<T> {
    /// The partition key.
    pub partition_key: Key<T>,
    /// The sort key, for tables with a composite primary key.
    pub sort_key: Option<Key<T>>,
}

impl<T: Serialize> TryFrom<Keys<T>> for collections::HashMap<String, types::AttributeValue> {
    type Error = Error;

    fn try_from(keys: Keys<T>) -> Result<Self> {
        let partition_key_value = to_attribute_value(keys.partition_key.value)?;
        let mut map = Self::from([(keys.partition_key.name, partition_key_value)]);
        if let Some(sort_key) = keys.sort_key {
            let sort_key_value = to_attribute_value(sort_key.value)?;
            map.insert(sort_key.name, sort_key_value);
        }
        Ok(map)
    }
}
