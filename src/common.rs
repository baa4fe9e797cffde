//! Expression building shared by the read and write operations.
//!
//! Every attribute name is bound through a `#name` placeholder and every value through a
//! `:name_<kind><n>` placeholder, so callers never write expression strings by hand.

/// Condition expressions for key conditions, filters and conditional writes.
pub mod condition;

/// Primary key types.
pub mod key;

use aws_sdk_dynamodb::types;
use std::collections;

pub(crate) fn placeholder(name: &str) -> String {
    format!("#{name}")
}

fn join_expression(left: String, operator: &str, right: String) -> String {
    if left.is_empty() {
        right
    } else if right.is_empty() {
        left
    } else {
        format!("{left}{operator}{right}")
    }
}

/// DynamoDB rejects empty `ExpressionAttributeNames` / `ExpressionAttributeValues` maps.
pub(crate) fn non_empty<K, V>(map: collections::HashMap<K, V>) -> Option<collections::HashMap<K, V>> {
    if map.is_empty() { None } else { Some(map) }
}

/// A rendered expression together with the placeholders it binds.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct ExpressionInput {
    pub(crate) expression: String,
    pub(crate) expression_attribute_names: collections::HashMap<String, String>,
    pub(crate) expression_attribute_values: collections::HashMap<String, types::AttributeValue>,
}

impl ExpressionInput {
    pub(crate) fn merge(operator: &str, items: Vec<Self>) -> Self {
        let mut operation = Self::default();
        for item in items {
            operation
                .expression_attribute_names
                .extend(item.expression_attribute_names);
            operation
                .expression_attribute_values
                .extend(item.expression_attribute_values);
            operation.expression =
                join_expression(operation.expression, operator, item.expression);
        }
        operation
    }

    /// Moves the bindings into the request-level maps and returns the bare expression.
    pub(crate) fn merge_into(
        self,
        names: &mut Option<collections::HashMap<String, String>>,
        values: &mut Option<collections::HashMap<String, types::AttributeValue>>,
    ) -> String {
        if !self.expression_attribute_names.is_empty() {
            names
                .get_or_insert_with(collections::HashMap::new)
                .extend(self.expression_attribute_names);
        }
        if !self.expression_attribute_values.is_empty() {
            values
                .get_or_insert_with(collections::HashMap::new)
                .extend(self.expression_attribute_values);
        }
        self.expression
    }
}
