use crate::{
    store::{Item, StoreError},
    users::{User, keys},
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

const USER_ID: &str = "user_id";

/// Non-key attributes of a stored user.
#[derive(Debug, Deserialize, Serialize)]
struct UserAttributes {
    user_id: String,
    name: String,
    email: String,
    password: String,
}

/// Encodes a user as a complete item, key attributes included.
pub fn marshal(user: &User) -> Result<Item, StoreError> {
    let attributes = UserAttributes {
        user_id: user.id.hyphenated().to_string(),
        name: user.name.clone(),
        email: user.email.clone(),
        password: user.password.clone(),
    };
    let mut item: Item = serde_dynamo::to_item(attributes)?;
    item.extend(keys::key_attributes(user.id));
    Ok(item)
}

/// Decodes a stored item, checking that its key attributes match its `user_id`.
pub fn unmarshal(mut item: Item) -> Result<User, StoreError> {
    let stored_keys: Item = keys::KEY_ATTRIBUTES
        .iter()
        .filter_map(|name| item.remove_entry(*name))
        .collect();
    let attributes: UserAttributes = serde_dynamo::from_item(item)?;
    let id = Uuid::parse_str(&attributes.user_id).map_err(|err| StoreError::InvalidAttribute {
        name: USER_ID.to_string(),
        reason: err.to_string(),
    })?;
    for (name, expected) in keys::key_attributes(id) {
        match stored_keys.get(&name) {
            Some(actual) if *actual == expected => {}
            Some(actual) => {
                return Err(StoreError::InvalidAttribute {
                    reason: format!("expected {expected:?}, found {actual:?}"),
                    name,
                });
            }
            None => {
                return Err(StoreError::InvalidAttribute {
                    name,
                    reason: "missing".to_string(),
                });
            }
        }
    }
    Ok(User {
        id,
        name: attributes.name,
        email: attributes.email,
        password: attributes.password,
    })
}
