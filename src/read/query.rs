use crate::{common, read};

use aws_sdk_dynamodb::{Client, error, operation};
use serde::Serialize;
use serde_dynamo::{Error, Result};

/// query operation
#[derive(Clone, Debug, Default, PartialEq)]
struct QueryInput {
    key_condition_expression: String,
    multiple_read_operation: read::common::MultipleReadInput,
    scan_index_forward: Option<bool>,
}

/// Query operation.
///
/// Every page is fetched: the output holds all matching items in index order.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_users::{common, read};
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let query = read::query::Query {
///     partition_key: common::key::Key::new("GSI1PK", "USER".to_string()),
///     multiple_read_args: read::common::MultipleReadArgs {
///         index_name: Some("GSI1".to_string()),
///         table_name: "BlogContent".to_string(),
///         ..Default::default()
///     },
///     ..Default::default()
/// };
/// let output = query.send(client).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query<T> {
    /// Table, index, filter and limit.
    pub multiple_read_args: read::common::MultipleReadArgs<T>,
    /// The partition key value to query for.
    pub partition_key: common::key::Key<T>,
    /// `Some(false)` reads the sort key in descending order.
    pub scan_index_forward: Option<bool>,
    /// Optional condition on the sort key.
    pub sort_key_condition: Option<common::condition::KeyCondition<T>>,
}

impl<T: Serialize> Query<T> {
    fn get_key_condition_expression(
        partition_key: common::key::Key<T>,
        sort_key_condition: Option<common::condition::KeyCondition<T>>,
    ) -> Result<common::ExpressionInput> {
        let partition_key = common::condition::KeyCondition::new(
            partition_key.name,
            common::condition::Condition::Equals(partition_key.value),
        );
        let mut keys = vec![partition_key];
        keys.extend(sort_key_condition);
        common::condition::KeyCondition::get_expression_operation(keys)
    }
}

impl<T: Serialize> TryFrom<Query<T>> for QueryInput {
    type Error = Error;

    fn try_from(query: Query<T>) -> Result<Self> {
        let mut multiple_read_operation: read::common::MultipleReadInput =
            query.multiple_read_args.try_into()?;
        let key_condition_operation =
            Query::get_key_condition_expression(query.partition_key, query.sort_key_condition)?;
        let key_condition_expression = key_condition_operation.merge_into(
            &mut multiple_read_operation.expression_attribute_names,
            &mut multiple_read_operation.expression_attribute_values,
        );
        let operation = Self {
            key_condition_expression,
            multiple_read_operation,
            scan_index_forward: query.scan_index_forward,
        };
        Ok(operation)
    }
}

impl<T: Serialize> Query<T> {
    /// Execute the query operation, following `LastEvaluatedKey` until exhausted.
    #[tracing::instrument(
        name = "dynamodb.query",
        skip_all,
        fields(
            table = %self.multiple_read_args.table_name,
            index = ?self.multiple_read_args.index_name,
        ),
        err(Display)
    )]
    pub async fn send(
        self,
        client: &Client,
    ) -> Result<operation::query::QueryOutput, error::SdkError<operation::query::QueryError>> {
        let query: QueryInput = self.try_into().map_err(error::BuildError::other)?;
        let builder = client
            .query()
            .key_condition_expression(query.key_condition_expression)
            .set_scan_index_forward(query.scan_index_forward);
        let mut paginator =
            crate::apply_multiple_read_operation!(builder, query.multiple_read_operation)
                .into_paginator()
                .send();
        crate::get_paginated_output!(paginator, operation::query::QueryOutput)
    }
}
