use crate::common;

use aws_sdk_dynamodb::types;
use serde::Serialize;
use serde_dynamo::{Error, Result};
use std::collections;

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct SingleReadInput {
    pub(crate) consistent_read: Option<bool>,
    pub(crate) table_name: String,
}

/// Arguments for single-item reads (GetItem).
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct SingleReadArgs {
    /// `Some(true)` for a strongly consistent read; eventually consistent otherwise.
    pub consistent_read: Option<bool>,
    /// The name of the table to read from.
    pub table_name: String,
}

impl From<SingleReadArgs> for SingleReadInput {
    fn from(single_read_args: SingleReadArgs) -> Self {
        Self {
            consistent_read: single_read_args.consistent_read,
            table_name: single_read_args.table_name,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct MultipleReadInput {
    pub(crate) consistent_read: Option<bool>,
    pub(crate) expression_attribute_names: Option<collections::HashMap<String, String>>,
    pub(crate) expression_attribute_values:
        Option<collections::HashMap<String, types::AttributeValue>>,
    pub(crate) filter_expression: Option<String>,
    pub(crate) index_name: Option<String>,
    pub(crate) limit: Option<i32>,
    pub(crate) table_name: String,
}

/// Arguments for multiple-item reads (Query).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultipleReadArgs<T> {
    /// Filter applied to the matched items after the key condition.
    pub condition: Option<common::condition::ConditionMap<T>>,
    /// `Some(true)` for a strongly consistent read. Not supported on global secondary indexes.
    pub consistent_read: Option<bool>,
    /// The secondary index to read instead of the base table.
    pub index_name: Option<String>,
    /// Maximum number of items evaluated per page.
    pub limit: Option<i32>,
    /// The name of the table to read from.
    pub table_name: String,
}

impl<T: Serialize> TryFrom<MultipleReadArgs<T>> for MultipleReadInput {
    type Error = Error;

    fn try_from(multiple_read_args: MultipleReadArgs<T>) -> Result<Self> {
        let mut operation = Self {
            consistent_read: multiple_read_args.consistent_read,
            index_name: multiple_read_args.index_name,
            limit: multiple_read_args.limit,
            table_name: multiple_read_args.table_name,
            ..Default::default()
        };
        if let Some(condition) = multiple_read_args.condition {
            let condition_operation: common::ExpressionInput = condition.try_into()?;
            let filter_expression = condition_operation.merge_into(
                &mut operation.expression_attribute_names,
                &mut operation.expression_attribute_values,
            );
            operation.filter_expression = Some(filter_expression);
        }
        Ok(operation)
    }
}

/// collect every page of a paginated read into a single output
#[macro_export]
macro_rules! get_paginated_output {
    ($paginator:expr, $output_type:ty) => {{
        let mut items = Vec::new();
        let mut count = 0;
        let mut scanned_count = 0;
        while let Some(page) = $paginator.next().await {
            let page = page?;
            count += page.count;
            scanned_count += page.scanned_count;
            if let Some(page_items) = page.items {
                items.extend(page_items);
            }
        }
        let output = <$output_type>::builder()
            .set_items(Some(items))
            .set_count(Some(count))
            .set_scanned_count(Some(scanned_count))
            .build();
        Ok(output)
    }};
}

/// apply common single read operation settings to a builder
#[macro_export]
macro_rules! apply_single_read_operation {
    ($builder:expr, $single_read_operation:expr) => {
        $builder
            .set_consistent_read($single_read_operation.consistent_read)
            .table_name($single_read_operation.table_name)
    };
}

/// apply common multiple read operation settings to a builder
#[macro_export]
macro_rules! apply_multiple_read_operation {
    ($builder:expr, $multiple_read_operation:expr) => {
        $builder
            .set_consistent_read($multiple_read_operation.consistent_read)
            .set_expression_attribute_names($multiple_read_operation.expression_attribute_names)
            .set_expression_attribute_values($multiple_read_operation.expression_attribute_values)
            .set_filter_expression($multiple_read_operation.filter_expression)
            .set_index_name($multiple_read_operation.index_name)
            .set_limit($multiple_read_operation.limit)
            .table_name($multiple_read_operation.table_name)
    };
}
