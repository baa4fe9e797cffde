//! The user entity and its persistence in the single-table layout.
//!
//! Each user is stored once under `PK = USER#<id>`, `SK = PROFILE`, and is projected into the
//! `GSI1` index under the fixed partition `USER` so the whole collection can be listed with a
//! single query.

/// Conversion between [`User`] and stored items.
pub mod codec;
/// Key layout of the single table.
pub mod keys;
/// Domain types.
pub mod model;
/// Cancellable CRUD over a [`crate::store::Store`].
pub mod repository;

pub use model::{User, UserPatch};
pub use repository::{RepositoryError, UserRepository};
