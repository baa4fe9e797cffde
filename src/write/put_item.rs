use crate::write;

use aws_sdk_dynamodb::{Client, error, operation, types};
use serde::Serialize;
use serde_dynamo::{Error, Result};
use std::collections;

/// put item operation
#[derive(Debug, PartialEq)]
struct PutItemInput {
    item: collections::HashMap<String, types::AttributeValue>,
    write_operation: write::common::WriteInput,
}

/// Put item operation: creates the item or replaces it in full.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::{Client, types::AttributeValue};
/// use dynamodb_users::{common, write};
/// use std::collections::HashMap;
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let put_item = write::put_item::PutItem::<String> {
///     item: HashMap::from([
///         ("PK".to_string(), AttributeValue::S("USER#1".to_string())),
///         ("SK".to_string(), AttributeValue::S("PROFILE".to_string())),
///     ]),
///     write_args: write::common::WriteArgs {
///         condition: Some(common::condition::ConditionMap::Leaves(
///             common::condition::LogicalOperator::And,
///             vec![
///                 common::condition::KeyCondition::new("PK", common::condition::Condition::NotExists),
///                 common::condition::KeyCondition::new("SK", common::condition::Condition::NotExists),
///             ],
///         )),
///         table_name: "BlogContent".to_string(),
///         ..Default::default()
///     },
/// };
/// put_item.send(client).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PutItem<T> {
    /// The complete item to write.
    pub item: collections::HashMap<String, types::AttributeValue>,
    /// Table name, condition and return values.
    pub write_args: write::common::WriteArgs<T>,
}

impl<T: Serialize> TryFrom<PutItem<T>> for PutItemInput {
    type Error = Error;

    fn try_from(put_item: PutItem<T>) -> Result<Self> {
        let write_operation: write::common::WriteInput = put_item.write_args.try_into()?;
        let operation = Self {
            item: put_item.item,
            write_operation,
        };
        Ok(operation)
    }
}

impl<T: Serialize> PutItem<T> {
    /// Execute the put item operation.
    #[tracing::instrument(
        name = "dynamodb.put_item",
        skip_all,
        fields(
            table = %self.write_args.table_name,
            conditional = self.write_args.condition.is_some(),
        ),
        err(Display)
    )]
    pub async fn send(
        self,
        client: &Client,
    ) -> Result<
        operation::put_item::PutItemOutput,
        error::SdkError<operation::put_item::PutItemError>,
    > {
        let put_item: PutItemInput = self.try_into().map_err(error::BuildError::other)?;
        let builder = client.put_item().set_item(Some(put_item.item));
        crate::apply_write_operation!(builder, put_item.write_operation)
            .send()
            .await
    }
}
