use crate::{
    read,
    store::{Item, Store, StoreError},
    write,
};

use async_trait::async_trait;
use aws_sdk_dynamodb::{
    Client,
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    operation::{
        delete_item::DeleteItemError, get_item::GetItemError, put_item::PutItemError,
        query::QueryError,
    },
};
use std::{error, fmt};

const THROTTLING_CODE: &str = "ThrottlingException";

/// [`Store`] backed by an AWS SDK DynamoDB client.
#[derive(Clone, Debug)]
pub struct DynamoStore {
    client: Client,
}

impl DynamoStore {
    /// Wraps an already configured client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client from the default AWS configuration chain, pointed at `endpoint`.
    ///
    /// Overriding the endpoint lets the same binary talk to DynamoDB Local or another emulator.
    pub async fn connect(endpoint: &str) -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .endpoint_url(endpoint)
            .load()
            .await;
        Self::new(Client::new(&config))
    }
}

#[async_trait]
impl Store for DynamoStore {
    async fn get_item(
        &self,
        get_item: read::get_item::GetItem<String>,
    ) -> Result<Option<Item>, StoreError> {
        let output = get_item
            .send(&self.client)
            .await
            .map_err(|err| map_sdk_error(err, classify_get_item_error))?;
        Ok(output.item)
    }

    async fn put_item(&self, put_item: write::put_item::PutItem<String>) -> Result<(), StoreError> {
        put_item
            .send(&self.client)
            .await
            .map_err(|err| map_sdk_error(err, classify_put_item_error))?;
        Ok(())
    }

    async fn delete_item(
        &self,
        delete_item: write::delete_item::DeleteItem<String>,
    ) -> Result<(), StoreError> {
        delete_item
            .send(&self.client)
            .await
            .map_err(|err| map_sdk_error(err, classify_delete_item_error))?;
        Ok(())
    }

    async fn query(&self, query: read::query::Query<String>) -> Result<Vec<Item>, StoreError> {
        let output = query
            .send(&self.client)
            .await
            .map_err(|err| map_sdk_error(err, classify_query_error))?;
        Ok(output.items.unwrap_or_default())
    }
}

/// Service errors go through `classify`; anything that never reached the service is transport.
fn map_sdk_error<E, R>(err: SdkError<E, R>, classify: fn(&E) -> Option<StoreError>) -> StoreError
where
    E: error::Error + ProvideErrorMetadata + 'static,
    R: fmt::Debug,
{
    match err {
        SdkError::ServiceError(service_error) => {
            let err = service_error.into_err();
            classify(&err).unwrap_or_else(|| {
                let message = DisplayErrorContext(&err).to_string();
                if err.code() == Some(THROTTLING_CODE) {
                    StoreError::Throttled(message)
                } else {
                    StoreError::Service(message)
                }
            })
        }
        err => StoreError::Transport(DisplayErrorContext(&err).to_string()),
    }
}

fn classify_get_item_error(err: &GetItemError) -> Option<StoreError> {
    match err {
        GetItemError::ProvisionedThroughputExceededException(_)
        | GetItemError::RequestLimitExceeded(_) => Some(StoreError::Throttled(err.to_string())),
        _ => None,
    }
}

fn classify_put_item_error(err: &PutItemError) -> Option<StoreError> {
    match err {
        PutItemError::ConditionalCheckFailedException(_) => Some(StoreError::ConditionFailed),
        PutItemError::ProvisionedThroughputExceededException(_)
        | PutItemError::RequestLimitExceeded(_) => Some(StoreError::Throttled(err.to_string())),
        _ => None,
    }
}

fn classify_delete_item_error(err: &DeleteItemError) -> Option<StoreError> {
    match err {
        DeleteItemError::ConditionalCheckFailedException(_) => Some(StoreError::ConditionFailed),
        DeleteItemError::ProvisionedThroughputExceededException(_)
        | DeleteItemError::RequestLimitExceeded(_) => Some(StoreError::Throttled(err.to_string())),
        _ => None,
    }
}

fn classify_query_error(err: &QueryError) -> Option<StoreError> {
    match err {
        QueryError::ProvisionedThroughputExceededException(_)
        | QueryError::RequestLimitExceeded(_) => Some(StoreError::Throttled(err.to_string())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use aws_sdk_dynamodb::{
        error::ErrorMetadata,
        types::error::{
            ConditionalCheckFailedException, ProvisionedThroughputExceededException,
            RequestLimitExceeded, ResourceNotFoundException,
        },
    };

    #[test]
    fn test_put_condition_failure_is_distinguished() {
        let err = SdkError::service_error(
            PutItemError::ConditionalCheckFailedException(
                ConditionalCheckFailedException::builder()
                    .message("The conditional request failed")
                    .build(),
            ),
            (),
        );
        let actual = map_sdk_error(err, classify_put_item_error);
        assert!(matches!(actual, StoreError::ConditionFailed));
    }

    #[test]
    fn test_delete_condition_failure_is_distinguished() {
        let err = SdkError::service_error(
            DeleteItemError::ConditionalCheckFailedException(
                ConditionalCheckFailedException::builder().build(),
            ),
            (),
        );
        let actual = map_sdk_error(err, classify_delete_item_error);
        assert!(matches!(actual, StoreError::ConditionFailed));
    }

    #[test]
    fn test_throughput_errors_are_throttling() {
        let err = SdkError::service_error(
            GetItemError::ProvisionedThroughputExceededException(
                ProvisionedThroughputExceededException::builder().build(),
            ),
            (),
        );
        assert!(matches!(
            map_sdk_error(err, classify_get_item_error),
            StoreError::Throttled(_)
        ));

        let err = SdkError::service_error(
            QueryError::RequestLimitExceeded(RequestLimitExceeded::builder().build()),
            (),
        );
        assert!(matches!(
            map_sdk_error(err, classify_query_error),
            StoreError::Throttled(_)
        ));
    }

    #[test]
    fn test_unmodelled_throttling_code_is_throttling() {
        let err = SdkError::service_error(
            PutItemError::generic(
                ErrorMetadata::builder()
                    .code(THROTTLING_CODE)
                    .message("Rate exceeded")
                    .build(),
            ),
            (),
        );
        assert!(matches!(
            map_sdk_error(err, classify_put_item_error),
            StoreError::Throttled(_)
        ));
    }

    #[test]
    fn test_other_service_errors_are_service() {
        let err = SdkError::service_error(
            GetItemError::ResourceNotFoundException(
                ResourceNotFoundException::builder()
                    .message("Requested resource not found")
                    .build(),
            ),
            (),
        );
        let actual = map_sdk_error(err, classify_get_item_error);
        assert!(matches!(actual, StoreError::Service(message) if message.contains("Requested resource not found")));
    }

    #[test]
    fn test_non_service_errors_are_transport() {
        let err: SdkError<QueryError, ()> = SdkError::construction_failure("endpoint unreachable");
        let actual = map_sdk_error(err, classify_query_error);
        assert!(matches!(actual, StoreError::Transport(_)));
    }
}
