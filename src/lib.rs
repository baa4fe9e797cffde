#![warn(missing_docs)]

//! # DynamoDB Users
//!
//! An HTTP JSON service exposing create, read, update, delete and list operations for users
//! stored in a single DynamoDB table.
//!
//! ## Overview
//!
//! Users live in the `BlogContent` table next to other entity types:
//! - `PK = USER#<id>`, `SK = PROFILE` identifies the user's item
//! - `GSI1PK = USER`, `GSI1SK = USER#<id>` places every user in one partition of the `GSI1` index
//!
//! Store requests are built from typed keys and conditions rather than expression strings, and
//! every repository call can be cancelled through a [`tokio_util::sync::CancellationToken`].
//!
//! ## Quick Example
//!
//! ```no_run
//! use dynamodb_users::{store::dynamodb::DynamoStore, users::{User, UserRepository}};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = DynamoStore::connect("http://localhost:8000").await;
//! let users = UserRepository::new(Arc::new(store));
//! let cancel = CancellationToken::new();
//!
//! let user = User::new(
//!     "Ann".to_string(),
//!     "ann@example.com".to_string(),
//!     "correct-horse".to_string(),
//! );
//! // Fails with `RepositoryError::AlreadyExists` if the id is taken.
//! let created = users.create(&cancel, user).await?;
//! let read = users.read(&cancel, created.id).await?;
//! assert_eq!(created, read);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`mod@common`] - Keys and condition expressions
//! - [`mod@read`] - Read operations (GetItem, Query)
//! - [`mod@write`] - Write operations (PutItem, DeleteItem)
//! - [`mod@store`] - The store capability with DynamoDB and in-memory implementations
//! - [`mod@users`] - The user entity, its item codec and repository
//! - [`mod@api`] - HTTP routes, validation and error mapping
//! - [`mod@config`], [`mod@telemetry`], [`mod@server`] - Process plumbing

pub mod common;

pub mod read;

pub mod write;

pub mod store;

pub mod users;

pub mod api;

pub mod config;

pub mod server;

pub mod telemetry;
