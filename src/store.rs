//! Narrow capability over the backing key-value store.
//!
//! The core only needs four item-level operations. [`Store`] exposes exactly those, with
//! conditional-check failures reported as their own [`StoreError::ConditionFailed`] kind so
//! callers can tell "the predicate did not hold" apart from a transport problem.

/// AWS SDK backed implementation.
pub mod dynamodb;

/// In-memory implementation with the same conditional semantics.
pub mod memory;

use crate::{read, write};

use async_trait::async_trait;
use aws_sdk_dynamodb::types;
use std::collections;
use thiserror::Error;

/// A stored item: attribute name to typed value.
pub type Item = collections::HashMap<String, types::AttributeValue>;

/// Errors surfaced by a [`Store`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The write's condition expression evaluated to false.
    #[error("conditional check failed")]
    ConditionFailed,
    /// The store rejected the request because of capacity or request limits.
    #[error("request throttled: {0}")]
    Throttled(String),
    /// The store returned an error response.
    #[error("store service error: {0}")]
    Service(String),
    /// The request never produced a service response (construction, dispatch, timeout).
    #[error("store transport error: {0}")]
    Transport(String),
    /// The caller cancelled the operation while it was in flight.
    #[error("operation cancelled")]
    Cancelled,
    /// Values could not be converted to or from attribute values.
    #[error("attribute serialization failed: {0}")]
    Serialization(#[from] serde_dynamo::Error),
    /// A stored attribute is missing or does not hold the expected value.
    #[error("invalid attribute `{name}`: {reason}")]
    InvalidAttribute {
        /// The attribute name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// Item-level operations over a single-table store.
///
/// Implementations hold no per-request state; every call is independent and may run
/// concurrently with any other.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Store: Send + Sync {
    /// Fetches the item at the key, `None` when absent.
    async fn get_item(
        &self,
        get_item: read::get_item::GetItem<String>,
    ) -> Result<Option<Item>, StoreError>;

    /// Writes a full item, subject to the optional condition.
    async fn put_item(&self, put_item: write::put_item::PutItem<String>) -> Result<(), StoreError>;

    /// Removes the item at the key, subject to the optional condition.
    async fn delete_item(
        &self,
        delete_item: write::delete_item::DeleteItem<String>,
    ) -> Result<(), StoreError>;

    /// Returns every item matching the key condition, ordered by sort key.
    async fn query(&self, query: read::query::Query<String>) -> Result<Vec<Item>, StoreError>;
}
