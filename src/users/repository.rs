use crate::{
    common::condition::{Condition, ConditionMap, KeyCondition, LogicalOperator},
    read,
    store::{Store, StoreError},
    users::{User, UserPatch, codec, keys},
    write,
};

use std::{future::Future, sync::Arc};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Errors returned by [`UserRepository`].
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No user is stored under the identifier.
    #[error("user not found")]
    NotFound,
    /// A user is already stored under the identifier.
    #[error("user already exists")]
    AlreadyExists,
    /// The store failed, was cancelled, or held an item that could not be decoded.
    #[error("store i/o failed: {0}")]
    Io(#[from] StoreError),
}

/// Convenience alias for repository results.
pub type Result<T> = std::result::Result<T, RepositoryError>;

/// User CRUD over the single-table layout.
///
/// Cloning is cheap; clones share the underlying store. Every operation takes a
/// [`CancellationToken`] and gives up with [`StoreError::Cancelled`] as soon as it fires.
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn Store>,
    table_name: String,
    index_name: String,
}

impl std::fmt::Debug for UserRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRepository")
            .field("table_name", &self.table_name)
            .field("index_name", &self.index_name)
            .finish_non_exhaustive()
    }
}

impl UserRepository {
    /// Repository over the `BlogContent` table and its `GSI1` index.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self::with_table(store, keys::TABLE_NAME, keys::INDEX_NAME)
    }

    /// Repository over another table laid out the same way.
    pub fn with_table(
        store: Arc<dyn Store>,
        table_name: impl Into<String>,
        index_name: impl Into<String>,
    ) -> Self {
        Self {
            store,
            table_name: table_name.into(),
            index_name: index_name.into(),
        }
    }

    /// Repository backed by an empty in-memory table.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(keys::memory_store()))
    }

    /// Stores a new user. Fails with [`RepositoryError::AlreadyExists`] when the id is taken.
    pub async fn create(&self, cancel: &CancellationToken, user: User) -> Result<User> {
        tracing::info!(user_id = %user.id, "creating user");
        let put_item = write::put_item::PutItem {
            item: codec::marshal(&user)?,
            write_args: write::common::WriteArgs {
                condition: Some(key_condition(Condition::NotExists)),
                table_name: self.table_name.clone(),
                ..Default::default()
            },
        };
        match cancellable(cancel, self.store.put_item(put_item)).await {
            Ok(()) => Ok(user),
            Err(StoreError::ConditionFailed) => Err(RepositoryError::AlreadyExists),
            Err(err) => Err(err.into()),
        }
    }

    /// Fetches a user with a strongly consistent read.
    pub async fn read(&self, cancel: &CancellationToken, id: Uuid) -> Result<User> {
        tracing::debug!(user_id = %id, "reading user");
        let get_item = read::get_item::GetItem {
            keys: keys::primary_key(id),
            single_read_args: read::common::SingleReadArgs {
                consistent_read: Some(true),
                table_name: self.table_name.clone(),
            },
        };
        let item = cancellable(cancel, self.store.get_item(get_item))
            .await?
            .ok_or(RepositoryError::NotFound)?;
        Ok(codec::unmarshal(item)?)
    }

    /// Applies the non-empty fields of `patch` and writes the whole user back.
    ///
    /// The read and the write are not atomic: a concurrent update may be overwritten.
    pub async fn update(
        &self,
        cancel: &CancellationToken,
        id: Uuid,
        patch: UserPatch,
    ) -> Result<User> {
        let mut user = self.read(cancel, id).await?;
        tracing::info!(user_id = %id, "updating user");
        patch.apply_to(&mut user);
        let put_item = write::put_item::PutItem {
            item: codec::marshal(&user)?,
            write_args: write::common::WriteArgs {
                table_name: self.table_name.clone(),
                ..Default::default()
            },
        };
        cancellable(cancel, self.store.put_item(put_item)).await?;
        Ok(user)
    }

    /// Removes a user. Fails with [`RepositoryError::NotFound`] when nothing is stored.
    pub async fn delete(&self, cancel: &CancellationToken, id: Uuid) -> Result<()> {
        tracing::info!(user_id = %id, "deleting user");
        let delete_item = write::delete_item::DeleteItem {
            keys: keys::primary_key(id),
            write_args: write::common::WriteArgs {
                condition: Some(key_condition(Condition::Exists)),
                table_name: self.table_name.clone(),
                ..Default::default()
            },
        };
        match cancellable(cancel, self.store.delete_item(delete_item)).await {
            Ok(()) => Ok(()),
            Err(StoreError::ConditionFailed) => Err(RepositoryError::NotFound),
            Err(err) => Err(err.into()),
        }
    }

    /// Lists every user, in index sort key order. The index is eventually consistent.
    pub async fn list_all(&self, cancel: &CancellationToken) -> Result<Vec<User>> {
        tracing::debug!("listing users");
        let query = read::query::Query {
            partition_key: keys::collection_key(),
            multiple_read_args: read::common::MultipleReadArgs {
                index_name: Some(self.index_name.clone()),
                table_name: self.table_name.clone(),
                ..Default::default()
            },
            ..Default::default()
        };
        let items = cancellable(cancel, self.store.query(query)).await?;
        tracing::debug!(count = items.len(), "listed users");
        let users = items
            .into_iter()
            .map(codec::unmarshal)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(users)
    }
}

/// The same condition on both primary key attributes.
fn key_condition(condition: Condition<String>) -> ConditionMap<String> {
    ConditionMap::Leaves(
        LogicalOperator::And,
        vec![
            KeyCondition::new(keys::PARTITION_KEY, condition.clone()),
            KeyCondition::new(keys::SORT_KEY, condition),
        ],
    )
}

async fn cancellable<T, F>(
    cancel: &CancellationToken,
    future: F,
) -> std::result::Result<T, StoreError>
where
    F: Future<Output = std::result::Result<T, StoreError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(StoreError::Cancelled),
        result = future => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Item, MockStore};

    use async_trait::async_trait;
    use aws_sdk_dynamodb::types::AttributeValue;
    use std::time::Duration;

    fn user(name: &str) -> User {
        User::new(
            name.to_string(),
            format!("{}@example.com", name.to_lowercase()),
            "password1".to_string(),
        )
    }

    #[tokio::test]
    async fn test_create_then_read() {
        let repository = UserRepository::in_memory();
        let cancel = CancellationToken::new();
        let created = repository.create(&cancel, user("Ann")).await.unwrap();

        let read = repository.read(&cancel, created.id).await.unwrap();
        assert_eq!(read, created);
    }

    #[tokio::test]
    async fn test_create_duplicate_id_is_rejected() {
        let repository = UserRepository::in_memory();
        let cancel = CancellationToken::new();
        let created = repository.create(&cancel, user("Ann")).await.unwrap();

        let duplicate = User {
            name: "Impostor".to_string(),
            ..created.clone()
        };
        let err = repository.create(&cancel, duplicate).await.unwrap_err();
        assert!(matches!(err, RepositoryError::AlreadyExists));
        assert_eq!(repository.read(&cancel, created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_read_missing_user() {
        let repository = UserRepository::in_memory();
        let err = repository
            .read(&CancellationToken::new(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_update_preserves_unset_fields() {
        let repository = UserRepository::in_memory();
        let cancel = CancellationToken::new();
        let created = repository.create(&cancel, user("Ann")).await.unwrap();

        let patch = UserPatch {
            name: "Annie".to_string(),
            ..Default::default()
        };
        let updated = repository.update(&cancel, created.id, patch).await.unwrap();

        let expected = User {
            name: "Annie".to_string(),
            ..created
        };
        assert_eq!(updated, expected);
        assert_eq!(repository.read(&cancel, expected.id).await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let repository = UserRepository::in_memory();
        let err = repository
            .update(&CancellationToken::new(), Uuid::new_v4(), UserPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let repository = UserRepository::in_memory();
        let cancel = CancellationToken::new();
        let created = repository.create(&cancel, user("Ann")).await.unwrap();

        repository.delete(&cancel, created.id).await.unwrap();
        let err = repository.delete(&cancel, created.id).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
        let err = repository.read(&cancel, created.id).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));

        let recreated = repository.create(&cancel, created.clone()).await.unwrap();
        assert_eq!(recreated, created);
        assert_eq!(repository.read(&cancel, created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_list_all_orders_by_id() {
        let repository = UserRepository::in_memory();
        let cancel = CancellationToken::new();
        let ids = [
            "cccccccc-cccc-4ccc-8ccc-cccccccccccc",
            "aaaaaaaa-aaaa-4aaa-8aaa-aaaaaaaaaaaa",
            "bbbbbbbb-bbbb-4bbb-8bbb-bbbbbbbbbbbb",
        ];
        for id in ids {
            let user = User {
                id: Uuid::parse_str(id).unwrap(),
                ..user("Ann")
            };
            repository.create(&cancel, user).await.unwrap();
        }

        let listed: Vec<String> = repository
            .list_all(&cancel)
            .await
            .unwrap()
            .into_iter()
            .map(|user| user.id.to_string())
            .collect();
        assert_eq!(listed, vec![ids[1], ids[2], ids[0]]);
    }

    #[tokio::test]
    async fn test_list_all_returns_every_user_once() {
        let repository = UserRepository::in_memory();
        let cancel = CancellationToken::new();
        assert!(repository.list_all(&cancel).await.unwrap().is_empty());

        let mut created = Vec::new();
        for name in ["Ann", "Bob", "Cy"] {
            created.push(repository.create(&cancel, user(name)).await.unwrap());
        }
        repository.delete(&cancel, created[1].id).await.unwrap();

        let mut listed = repository.list_all(&cancel).await.unwrap();
        listed.sort_by_key(|user| user.name.clone());
        assert_eq!(listed, vec![created[0].clone(), created[2].clone()]);
    }

    #[tokio::test]
    async fn test_list_all_skips_items_outside_the_index() {
        let store = Arc::new(keys::memory_store());
        let repository = UserRepository::new(store.clone());
        let cancel = CancellationToken::new();
        let created = repository.create(&cancel, user("Ann")).await.unwrap();
        store
            .insert_raw(Item::from([
                ("PK".to_string(), AttributeValue::S("POST#1".to_string())),
                ("SK".to_string(), AttributeValue::S("METADATA".to_string())),
            ]))
            .await
            .unwrap();

        assert_eq!(repository.list_all(&cancel).await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn test_corrupt_item_is_an_io_error() {
        let store = Arc::new(keys::memory_store());
        let repository = UserRepository::new(store.clone());
        let cancel = CancellationToken::new();
        let created = repository.create(&cancel, user("Ann")).await.unwrap();

        let mut item = codec::marshal(&created).unwrap();
        item.insert(
            "GSI1SK".to_string(),
            AttributeValue::S("USER#someone-else".to_string()),
        );
        store.insert_raw(item).await.unwrap();

        let err = repository.read(&cancel, created.id).await.unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::Io(StoreError::InvalidAttribute { .. })
        ));
        let err = repository.list_all(&cancel).await.unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::Io(StoreError::InvalidAttribute { .. })
        ));
    }

    #[tokio::test]
    async fn test_requests_target_the_configured_table() {
        let mut store = MockStore::new();
        store
            .expect_put_item()
            .withf(|put_item| {
                put_item.write_args.table_name == "Users"
                    && put_item.write_args.condition == Some(key_condition(Condition::NotExists))
            })
            .times(1)
            .returning(|_| Ok(()));
        store
            .expect_get_item()
            .withf(|get_item| {
                get_item.single_read_args.table_name == "Users"
                    && get_item.single_read_args.consistent_read == Some(true)
            })
            .times(1)
            .returning(|_| Ok(None));
        store
            .expect_query()
            .withf(|query| {
                query.multiple_read_args.index_name.as_deref() == Some("ByKind")
                    && query.partition_key == keys::collection_key()
            })
            .times(1)
            .returning(|_| Ok(Vec::new()));
        store
            .expect_delete_item()
            .withf(|delete_item| {
                delete_item.write_args.condition == Some(key_condition(Condition::Exists))
            })
            .times(1)
            .returning(|_| Err(StoreError::ConditionFailed));

        let repository = UserRepository::with_table(Arc::new(store), "Users", "ByKind");
        let cancel = CancellationToken::new();
        let created = repository.create(&cancel, user("Ann")).await.unwrap();
        assert!(matches!(
            repository.read(&cancel, created.id).await,
            Err(RepositoryError::NotFound)
        ));
        assert!(repository.list_all(&cancel).await.unwrap().is_empty());
        assert!(matches!(
            repository.delete(&cancel, created.id).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_store_failures_are_io_errors() {
        let mut store = MockStore::new();
        store
            .expect_put_item()
            .returning(|_| Err(StoreError::Transport("connection reset".to_string())));
        store
            .expect_query()
            .returning(|_| Err(StoreError::Throttled("slow down".to_string())));

        let repository = UserRepository::new(Arc::new(store));
        let cancel = CancellationToken::new();
        assert!(matches!(
            repository.create(&cancel, user("Ann")).await,
            Err(RepositoryError::Io(StoreError::Transport(_)))
        ));
        assert!(matches!(
            repository.list_all(&cancel).await,
            Err(RepositoryError::Io(StoreError::Throttled(_)))
        ));
    }

    /// Store whose calls never complete.
    struct PendingStore;

    #[async_trait]
    impl Store for PendingStore {
        async fn get_item(
            &self,
            _: read::get_item::GetItem<String>,
        ) -> std::result::Result<Option<Item>, StoreError> {
            std::future::pending().await
        }

        async fn put_item(
            &self,
            _: write::put_item::PutItem<String>,
        ) -> std::result::Result<(), StoreError> {
            std::future::pending().await
        }

        async fn delete_item(
            &self,
            _: write::delete_item::DeleteItem<String>,
        ) -> std::result::Result<(), StoreError> {
            std::future::pending().await
        }

        async fn query(
            &self,
            _: read::query::Query<String>,
        ) -> std::result::Result<Vec<Item>, StoreError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_in_flight_calls() {
        let repository = UserRepository::new(Arc::new(PendingStore));
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = repository.read(&cancel, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Io(StoreError::Cancelled)));
        let err = repository.create(&cancel, user("Ann")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Io(StoreError::Cancelled)));
    }

    #[tokio::test]
    async fn test_cancelled_token_skips_the_store() {
        let repository = UserRepository::in_memory();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = repository.create(&cancel, user("Ann")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Io(StoreError::Cancelled)));
        assert!(
            repository
                .list_all(&CancellationToken::new())
                .await
                .unwrap()
                .is_empty()
        );
    }
}
